//! CityJSON serialization - writes a [`City`] back to a CityJSON document
//!
//! Minimal writer used for round-trip checks and as input for other tools:
//! buildings with their parts (one `MultiSurface` per LOD) and the terrain
//! as a `TINRelief`. Vertices are quantized with a uniform scale and
//! identical quantized vertices are shared.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::model::{Attributes, City, LodGeometry, Mesh, MultiSurface, Point3};
use crate::parsing::DOCUMENT_TYPE;

/// CityJSON version written into the document
pub const CITYJSON_VERSION: &str = "2.0";

/// Default quantization step (millimetres for metric data)
pub const DEFAULT_SCALE: f64 = 0.001;

/// Quantized, deduplicated vertex list under construction
struct VertexWriter {
    scale: f64,
    vertices: Vec<[i64; 3]>,
    lookup: HashMap<[i64; 3], usize>,
}

impl VertexWriter {
    fn new(scale: f64) -> Self {
        Self {
            scale,
            vertices: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn index_of(&mut self, p: &Point3) -> usize {
        let q = [
            (p.x / self.scale).round() as i64,
            (p.y / self.scale).round() as i64,
            (p.z / self.scale).round() as i64,
        ];
        let next = self.vertices.len();
        *self.lookup.entry(q).or_insert_with(|| {
            self.vertices.push(q);
            next
        })
    }

    /// `[minx, miny, minz, maxx, maxy, maxz]` of the written vertices
    fn extent(&self) -> Option<[f64; 6]> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        let s = self.scale;
        Some([
            min[0] as f64 * s,
            min[1] as f64 * s,
            min[2] as f64 * s,
            max[0] as f64 * s,
            max[1] as f64 * s,
            max[2] as f64 * s,
        ])
    }
}

fn multisurface_to_json(lod: i32, ms: &MultiSurface, vertices: &mut VertexWriter) -> Value {
    let boundaries: Vec<Value> = ms
        .surfaces
        .iter()
        .map(|s| {
            let ring: Vec<usize> = s.points.iter().map(|p| vertices.index_of(p)).collect();
            json!([ring])
        })
        .collect();

    let mut geometry = json!({
        "type": "MultiSurface",
        "lod": lod.to_string(),
        "boundaries": boundaries,
    });

    if !ms.semantics.is_empty() {
        let mut surfaces = Vec::new();
        let values: Vec<Value> = ms
            .semantics
            .iter()
            .map(|tag| match tag {
                Some(tag) => {
                    surfaces.push(Value::Object(tag.clone()));
                    json!(surfaces.len() - 1)
                }
                None => Value::Null,
            })
            .collect();
        geometry["semantics"] = json!({ "surfaces": surfaces, "values": values });
    }
    geometry
}

fn object_to_json(
    object_type: &str,
    attributes: &Attributes,
    geometry: &LodGeometry,
    vertices: &mut VertexWriter,
) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("type".into(), json!(object_type));
    if !attributes.is_empty() {
        object.insert("attributes".into(), Value::Object(attributes.clone()));
    }
    let geometry: Vec<Value> = geometry
        .iter()
        .map(|(&lod, ms)| multisurface_to_json(lod, ms, vertices))
        .collect();
    object.insert("geometry".into(), Value::Array(geometry));
    object
}

fn terrain_to_json(mesh: &Mesh, vertices: &mut VertexWriter) -> Value {
    let faces: Vec<Value> = mesh
        .faces()
        .iter()
        .map(|f| {
            let ring: Vec<usize> = f.iter().map(|&i| vertices.index_of(&mesh.vertices()[i])).collect();
            json!([ring])
        })
        .collect();
    json!({
        "type": "TINRelief",
        "geometry": [{
            "type": "CompositeSurface",
            "lod": "1",
            "boundaries": faces,
        }]
    })
}

/// Id for the terrain object that does not collide with any building id
fn terrain_id(city: &City) -> String {
    let taken = |id: &str| {
        city.buildings()
            .iter()
            .any(|b| b.id() == id || b.parts().iter().any(|p| p.id() == id))
    };
    let mut id = "terrain".to_string();
    let mut n = 1;
    while taken(&id) {
        id = format!("terrain-{}", n);
        n += 1;
    }
    id
}

/// Build a CityJSON document for a city.
///
/// `scale` is the quantization step and must be positive and finite.
pub fn city_to_cityjson(city: &City, scale: f64) -> Result<Value> {
    anyhow::ensure!(scale.is_finite() && scale > 0.0, "invalid scale {}", scale);

    let mut vertices = VertexWriter::new(scale);
    let mut objects = Map::new();

    for building in city.buildings() {
        let mut object = object_to_json("Building", building.attributes(), building.geometry(), &mut vertices);
        if !building.parts().is_empty() {
            let children: Vec<&str> = building.parts().iter().map(|p| p.id()).collect();
            object.insert("children".into(), json!(children));
        }
        objects.insert(building.id().to_string(), Value::Object(object));

        for part in building.parts() {
            let mut object = object_to_json("BuildingPart", part.attributes(), part.geometry(), &mut vertices);
            object.insert("parents".into(), json!([part.parent_id()]));
            objects.insert(part.id().to_string(), Value::Object(object));
        }
    }

    if let Some(mesh) = city.terrain_mesh() {
        objects.insert(terrain_id(city), terrain_to_json(mesh, &mut vertices));
    }

    let mut document = json!({
        "type": DOCUMENT_TYPE,
        "version": CITYJSON_VERSION,
        "transform": {
            "scale": [scale, scale, scale],
            "translate": [0.0, 0.0, 0.0],
        },
        "CityObjects": objects,
        "vertices": vertices.vertices,
    });
    if let Some(extent) = vertices.extent() {
        document["metadata"] = json!({ "geographicalExtent": extent });
    }
    Ok(document)
}

/// Serialize a city to a CityJSON string
pub fn city_to_string(city: &City, scale: f64) -> Result<String> {
    let document = city_to_cityjson(city, scale)?;
    serde_json::to_string(&document).context("Failed to serialize CityJSON")
}

/// Write a city to a CityJSON file on disk
pub fn city_to_file<P: AsRef<Path>>(city: &City, file_path: P, scale: f64) -> Result<()> {
    let document = city_to_cityjson(city, scale)?;
    let file = File::create(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.as_ref().display()))?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    serde_json::to_writer(&mut writer, &document).context("Failed to serialize CityJSON")?;
    writer.flush().context("Failed to flush CityJSON writer")?;
    Ok(())
}
