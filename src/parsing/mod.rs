//! CityJSON parsing module
//!
//! Turns an in-memory CityJSON document into a [`City`].
//!
//! # Submodules
//! - `records` - Typed City Object records and geometry entries
//! - `vertices` - Transform and shared vertex pool
//! - `boundaries` - Boundary resolution into surfaces
//! - `lod` - Level-of-detail selection
//! - `objects` - Object graph construction (buildings and parts)
//! - `terrain` - TIN extraction and mesh welding

mod records;
mod vertices;
mod boundaries;
mod lod;
mod objects;
mod terrain;

use std::time::Instant;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{CityJsonError, Result};
use crate::model::{Bounds, City, Terrain, Warning};

pub use boundaries::{outer_rings, resolve, ring_indices};
pub use lod::select;
pub use objects::{ObjectGraph, ObjectGraphBuilder};
pub use records::{decode_records, CityObjectRecord, CityObjectType, GeometryEntry, GeometryKind, DEFAULT_GEOMETRY_LOD};
pub use terrain::{tin_triangles, weld};
pub use vertices::{RawTransform, Transform, VertexPool};

/// Value of the top-level `type` member of a CityJSON document
pub const DOCUMENT_TYPE: &str = "CityJSON";

/// Load settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// LODs to select per object; each selection is stored under the LOD it found
    pub lods: Vec<i32>,
    /// Prefer surface representations over solids when several share a LOD
    pub prefer_surface: bool,
    /// Resolve buildings on the rayon thread pool
    pub parallel: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            lods: vec![2],
            prefer_surface: true,
            parallel: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(rename = "geographicalExtent")]
    geographical_extent: Option<Vec<f64>>,
}

/// The parts of a document the loader reads
#[derive(Debug, Deserialize)]
struct RawDocument {
    transform: Option<RawTransform>,
    metadata: Option<RawMetadata>,
    #[serde(default)]
    vertices: Vec<[f64; 3]>,
    #[serde(rename = "CityObjects", default)]
    city_objects: IndexMap<String, Value>,
}

fn check_document_type(document: &Value) -> Result<()> {
    match document.get("type").and_then(Value::as_str) {
        Some(DOCUMENT_TYPE) => Ok(()),
        Some(other) => Err(CityJsonError::NotACityDocument(format!(
            "type is '{}', expected '{}'",
            other, DOCUMENT_TYPE
        ))),
        None => Err(CityJsonError::NotACityDocument("missing top-level 'type'".into())),
    }
}

/// Bounds from `metadata.geographicalExtent` (XY only)
fn extent_bounds(metadata: Option<&RawMetadata>, warnings: &mut Vec<Warning>) -> Option<Bounds> {
    let extent = metadata?.geographical_extent.as_ref()?;
    match extent.as_slice() {
        &[xmin, ymin, _, xmax, ymax, _] => Some(Bounds::new(xmin, ymin, xmax, ymax)),
        _ => {
            warnings.push(Warning::MalformedExtent { len: extent.len() });
            None
        }
    }
}

/// Weld the first TIN source; further sources are reported, not merged
fn build_terrain(
    candidates: &[&CityObjectRecord],
    pool: &VertexPool,
    warnings: &mut Vec<Warning>,
) -> Option<Terrain> {
    let (first, rest) = candidates.split_first()?;
    if !rest.is_empty() {
        warnings.push(Warning::TerrainSourcesIgnored {
            used: first.id.clone(),
            ignored: rest.len(),
        });
    }

    let mesh = tin_triangles(first).and_then(|triangles| weld(&triangles, pool));
    match mesh {
        Ok(mesh) if !mesh.is_empty() => Some(Terrain::new(mesh)),
        Ok(_) => None,
        Err(source) => {
            warnings.push(Warning::TerrainResolution {
                id: first.id.clone(),
                source,
            });
            None
        }
    }
}

/// Assemble a [`City`] from a parsed CityJSON document.
///
/// Fails only for document-level problems (wrong `type`, malformed
/// top-level members, malformed transform). City Objects are decoded one
/// by one, so a malformed object or geometry entry is returned as a
/// warning on the city and the rest of the document still loads.
pub fn assemble(document: &Value, options: &LoadOptions) -> Result<City> {
    let start = Instant::now();
    check_document_type(document)?;

    let raw = RawDocument::deserialize(document)?;
    let mut warnings = Vec::new();
    let records = decode_records(&raw.city_objects, &mut warnings);

    let transform = Transform::from_raw(raw.transform.as_ref())?;
    let pool = VertexPool::build(&raw.vertices, &transform);
    debug!(
        vertices = pool.len(),
        objects = records.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "decoded document"
    );

    let graph_start = Instant::now();
    let ObjectGraph {
        buildings,
        terrain_candidates,
        warnings: graph_warnings,
    } = ObjectGraphBuilder::new(&records, &pool, options).build();
    warnings.extend(graph_warnings);
    debug!(
        buildings = buildings.len(),
        elapsed_ms = graph_start.elapsed().as_secs_f64() * 1000.0,
        "built object graph"
    );

    let terrain = build_terrain(&terrain_candidates, &pool, &mut warnings);

    let bounds = extent_bounds(raw.metadata.as_ref(), &mut warnings)
        .or_else(|| buildings.iter().filter_map(|b| b.bounds()).reduce(Bounds::union));

    for warning in &warnings {
        warn!("{}", warning);
    }

    let city = City::new(bounds, buildings, terrain, warnings);
    info!(
        buildings = city.buildings().len(),
        terrain_vertices = city.terrain_mesh().map_or(0, |m| m.vertex_count()),
        warnings = city.warnings().len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "loaded CityJSON"
    );
    Ok(city)
}

/// Parse CityJSON text and assemble it
pub fn parse_str(text: &str, options: &LoadOptions) -> Result<City> {
    let document: Value = serde_json::from_str(text)?;
    assemble(&document, options)
}

/// Parse CityJSON bytes and assemble them
pub fn parse_slice(bytes: &[u8], options: &LoadOptions) -> Result<City> {
    let document: Value = serde_json::from_slice(bytes)?;
    assemble(&document, options)
}
