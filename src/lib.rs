//! CityJSON ingestion
//!
//! Loads CityJSON documents into a typed [`City`]: buildings with their
//! parts and per-LOD surfaces, a welded terrain mesh and 2D bounds.
//!
//! # Example
//! ```ignore
//! let city = cityjson_io::load_city_file("tests/data/two_buildings.city.json")?;
//! for building in city.buildings() {
//!     println!("{}: {} LOD(s)", building.id(), building.geometry().len());
//! }
//! ```

pub mod error;
pub mod model;
pub mod parsing;
pub mod serialize_cityjson;

use std::fs;
use std::path::Path;

use anyhow::Context;

pub use error::{CityJsonError, Result};
pub use model::{Bounds, Building, BuildingIndex, BuildingPart, City, Mesh, MultiSurface, Point3, Surface, Terrain, Warning};
pub use parsing::{assemble, parse_slice, parse_str, LoadOptions};
pub use serialize_cityjson::{city_to_cityjson, city_to_file, city_to_string};

/// Loads a CityJSON file with default options
///
/// # Arguments
/// * `path` - The file path to the CityJSON document
///
/// # Returns
/// * `anyhow::Result<City>` - The loaded city, or an error naming the file
pub fn load_city_file<P: AsRef<Path>>(path: P) -> anyhow::Result<City> {
    load_city_file_with(path, &LoadOptions::default())
}

/// Loads a CityJSON file with explicit [`LoadOptions`]
pub fn load_city_file_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> anyhow::Result<City> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let city = parse_slice(&bytes, options).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(city)
}
