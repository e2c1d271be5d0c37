//! City object graph
//!
//! The aggregate handed back by a load: buildings with their parts, an
//! optional terrain mesh, bounds and the non-fatal warnings collected on
//! the way. All of it is built once by the parser and exposed read-only.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::types::{Bounds, Mesh, MultiSurface};
use crate::error::CityJsonError;

/// Attribute map copied from a City Object's `attributes` member
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Resolved geometry keyed by integer LOD, at most one per LOD
pub type LodGeometry = BTreeMap<i32, MultiSurface>;

/// Non-fatal problem found while loading; the affected object is skipped
/// or loaded without the offending geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("skipped object '{id}': {source}")]
    UnsupportedObject { id: String, source: CityJsonError },

    #[error("skipped object '{id}': {source}")]
    MalformedObject { id: String, source: CityJsonError },

    #[error("skipped BuildingPart '{id}': it has no parent building")]
    OrphanBuildingPart { id: String },

    #[error("building '{parent}' lists child '{child}' which does not exist")]
    MissingChild { parent: String, child: String },

    #[error("child '{child}' of '{parent}' already belongs to building '{owner}'")]
    ChildAlreadyOwned {
        parent: String,
        child: String,
        owner: String,
    },

    #[error("geometry of '{id}' could not be resolved: {source}")]
    GeometryResolution { id: String, source: CityJsonError },

    #[error("{ignored} additional TINRelief object(s) ignored, only '{used}' was used")]
    TerrainSourcesIgnored { used: String, ignored: usize },

    #[error("terrain '{id}' could not be welded: {source}")]
    TerrainResolution { id: String, source: CityJsonError },

    #[error("metadata.geographicalExtent has {len} values, expected 6")]
    MalformedExtent { len: usize },
}

/// A part of a building, exclusively owned by one [`Building`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingPart {
    id: String,
    parent_id: String,
    attributes: Attributes,
    geometry: LodGeometry,
    #[serde(skip)]
    errors: Vec<CityJsonError>,
}

impl BuildingPart {
    pub(crate) fn new(
        id: String,
        parent_id: String,
        attributes: Attributes,
        geometry: LodGeometry,
        errors: Vec<CityJsonError>,
    ) -> Self {
        Self { id, parent_id, attributes, geometry, errors }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the owning building (lookup only, not ownership)
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn geometry(&self) -> &LodGeometry {
        &self.geometry
    }

    pub fn lod(&self, lod: i32) -> Option<&MultiSurface> {
        self.geometry.get(&lod)
    }

    /// Geometry resolution failures for this part
    pub fn errors(&self) -> &[CityJsonError] {
        &self.errors
    }
}

/// A root `Building` City Object with its resolved geometry and parts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    id: String,
    attributes: Attributes,
    geometry: LodGeometry,
    parts: Vec<BuildingPart>,
    #[serde(skip)]
    errors: Vec<CityJsonError>,
}

impl Building {
    pub(crate) fn new(
        id: String,
        attributes: Attributes,
        geometry: LodGeometry,
        parts: Vec<BuildingPart>,
        errors: Vec<CityJsonError>,
    ) -> Self {
        Self { id, attributes, geometry, parts, errors }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn geometry(&self) -> &LodGeometry {
        &self.geometry
    }

    pub fn lod(&self, lod: i32) -> Option<&MultiSurface> {
        self.geometry.get(&lod)
    }

    pub fn parts(&self) -> &[BuildingPart] {
        &self.parts
    }

    /// Geometry resolution failures for the building itself (not its parts)
    pub fn errors(&self) -> &[CityJsonError] {
        &self.errors
    }

    /// XY envelope of every geometry of the building and its parts
    pub fn bounds(&self) -> Option<Bounds> {
        self.geometry
            .values()
            .chain(self.parts.iter().flat_map(|p| p.geometry.values()))
            .filter_map(MultiSurface::bounds)
            .reduce(Bounds::union)
    }
}

/// Terrain surface, owning at most one mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Terrain {
    mesh: Option<Mesh>,
}

impl Terrain {
    pub(crate) fn new(mesh: Mesh) -> Self {
        Self { mesh: Some(mesh) }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }
}

/// Counts used by the CLI report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CitySummary {
    pub buildings: usize,
    pub building_parts: usize,
    pub surfaces: usize,
    pub terrain_vertices: usize,
    pub terrain_faces: usize,
    pub warnings: usize,
}

/// Root aggregate of a loaded CityJSON document
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct City {
    bounds: Option<Bounds>,
    buildings: Vec<Building>,
    terrain: Option<Terrain>,
    #[serde(skip)]
    warnings: Vec<Warning>,
}

impl City {
    pub(crate) fn new(
        bounds: Option<Bounds>,
        buildings: Vec<Building>,
        terrain: Option<Terrain>,
        warnings: Vec<Warning>,
    ) -> Self {
        Self { bounds, buildings, terrain, warnings }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Buildings in document order
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn terrain_mesh(&self) -> Option<&Mesh> {
        self.terrain.as_ref().and_then(Terrain::mesh)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn summary(&self) -> CitySummary {
        let surfaces_in = |g: &LodGeometry| g.values().map(MultiSurface::len).sum::<usize>();
        let mesh = self.terrain_mesh();
        CitySummary {
            buildings: self.buildings.len(),
            building_parts: self.buildings.iter().map(|b| b.parts.len()).sum(),
            surfaces: self
                .buildings
                .iter()
                .map(|b| surfaces_in(&b.geometry) + b.parts.iter().map(|p| surfaces_in(&p.geometry)).sum::<usize>())
                .sum(),
            terrain_vertices: mesh.map_or(0, Mesh::vertex_count),
            terrain_faces: mesh.map_or(0, Mesh::face_count),
            warnings: self.warnings.len(),
        }
    }
}
