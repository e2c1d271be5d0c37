//! Terrain mesh welding
//!
//! TIN triangles reference the document-wide vertex pool, which also holds
//! every building vertex. Welding keeps only the vertices the triangles
//! use and renumbers them contiguously.

use std::collections::{BTreeSet, HashMap};

use super::boundaries::outer_rings;
use super::records::CityObjectRecord;
use super::vertices::VertexPool;
use crate::error::{CityJsonError, Result};
use crate::model::Mesh;

/// Build a compact mesh from triangles over global pool indices.
///
/// Retained vertices are ordered by ascending global index, not by first
/// use. An empty triangle list gives an empty mesh.
pub fn weld(triangles: &[[usize; 3]], pool: &VertexPool) -> Result<Mesh> {
    let used: BTreeSet<usize> = triangles.iter().flatten().copied().collect();

    let mut remap: HashMap<usize, usize> = HashMap::with_capacity(used.len());
    let mut vertices = Vec::with_capacity(used.len());
    for (local, &global) in used.iter().enumerate() {
        vertices.push(pool.get(global)?);
        remap.insert(global, local);
    }

    let faces = triangles
        .iter()
        .map(|t| [remap[&t[0]], remap[&t[1]], remap[&t[2]]])
        .collect();

    Ok(Mesh::from_compact(vertices, faces))
}

/// Triangles of a `TINRelief` object, gathered over all of its geometry entries
pub fn tin_triangles(record: &CityObjectRecord) -> Result<Vec<[usize; 3]>> {
    if let Some(err) = record.geometry_errors.first() {
        return Err(err.clone());
    }
    let mut triangles = Vec::new();
    for entry in &record.geometry {
        for ring in outer_rings(&entry.boundaries)? {
            match ring.as_slice() {
                &[a, b, c] => triangles.push([a, b, c]),
                _ => {
                    return Err(CityJsonError::MalformedBoundary(format!(
                        "TIN face with {} vertices, expected 3",
                        ring.len()
                    )))
                }
            }
        }
    }
    Ok(triangles)
}
