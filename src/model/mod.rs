//! In-memory city model
//!
//! # Submodules
//! - `types` - Points, bounds, surfaces and meshes
//! - `city` - City, Building, BuildingPart, Terrain and warnings
//! - `spatial` - R-tree index over building footprints
//! - `tessellation` - Triangulation of multi-surfaces into meshes

mod types;
mod city;
mod spatial;
mod tessellation;

pub use types::{Bounds, Mesh, MultiSurface, Point3, SemanticTags, Surface};

pub use city::{
    Attributes,
    Building,
    BuildingPart,
    City,
    CitySummary,
    LodGeometry,
    Terrain,
    Warning,
};

pub use spatial::{BuildingEnvelope, BuildingIndex};

pub use tessellation::triangulate_surface;
