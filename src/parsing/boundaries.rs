//! Boundary resolution
//!
//! Turns index-based boundaries into surfaces of resolved points.
//!
//! Nesting by geometry type:
//! - `MultiSurface` / `CompositeSurface`: `[surface][ring][index]`
//! - `Solid`: `[shell][surface][ring][index]`, only the exterior shell is used
//!
//! Ring 0 of each surface is the outer boundary. Hole rings are checked
//! for structure and then dropped.

use serde_json::Value;

use super::records::{GeometryEntry, GeometryKind};
use super::vertices::VertexPool;
use crate::error::{CityJsonError, Result};
use crate::model::{MultiSurface, SemanticTags, Surface};

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| CityJsonError::MalformedBoundary(format!("expected {} array, found {}", what, value)))
}

/// Vertex indices of one ring
pub fn ring_indices(ring: &Value) -> Result<Vec<usize>> {
    as_array(ring, "ring")?
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| CityJsonError::MalformedBoundary(format!("invalid vertex index {}", v)))
        })
        .collect()
}

/// Outer ring indices of every surface in a `[surface][ring][index]` array.
///
/// Hole rings are validated but not returned.
pub fn outer_rings(surfaces: &Value) -> Result<Vec<Vec<usize>>> {
    as_array(surfaces, "surface list")?
        .iter()
        .map(|surface| -> Result<Vec<usize>> {
            let rings = as_array(surface, "surface")?;
            let (outer, holes) = rings
                .split_first()
                .ok_or_else(|| CityJsonError::MalformedBoundary("surface without rings".into()))?;
            for hole in holes {
                ring_indices(hole)?;
            }
            ring_indices(outer)
        })
        .collect()
}

/// Surface list to resolve for a geometry entry, after the type check
fn surface_list(entry: &GeometryEntry) -> Result<&Value> {
    match &entry.kind {
        GeometryKind::MultiSurface | GeometryKind::CompositeSurface => Ok(&entry.boundaries),
        GeometryKind::Solid => as_array(&entry.boundaries, "shell list")?
            .first()
            .ok_or_else(|| CityJsonError::MalformedBoundary("solid without exterior shell".into())),
        GeometryKind::Other(name) => Err(CityJsonError::UnsupportedGeometryType(name.clone())),
    }
}

/// Per-surface semantic objects, or an empty list when the entry has none.
///
/// `values` is indexed like the resolved surfaces; for a solid the first
/// shell's value list is used.
fn resolve_semantics(entry: &GeometryEntry, surface_count: usize) -> Vec<Option<SemanticTags>> {
    let Some(semantics) = entry.semantics.as_ref() else {
        return Vec::new();
    };
    let (Some(objects), Some(values)) = (
        semantics.get("surfaces").and_then(Value::as_array),
        semantics.get("values"),
    ) else {
        return Vec::new();
    };
    let values = match entry.kind {
        GeometryKind::Solid => values.get(0),
        _ => Some(values),
    }
    .and_then(Value::as_array);
    let Some(values) = values else {
        return Vec::new();
    };

    (0..surface_count)
        .map(|i| {
            values
                .get(i)
                .and_then(Value::as_u64)
                .and_then(|idx| objects.get(idx as usize))
                .and_then(Value::as_object)
                .cloned()
        })
        .collect()
}

/// Resolve a geometry entry into a [`MultiSurface`].
///
/// Points keep the order of the source ring, closing duplicates included.
pub fn resolve(entry: &GeometryEntry, pool: &VertexPool) -> Result<MultiSurface> {
    let rings = outer_rings(surface_list(entry)?)?;

    let surfaces = rings
        .iter()
        .map(|ring| -> Result<Surface> {
            let points = ring.iter().map(|&i| pool.get(i)).collect::<Result<Vec<_>>>()?;
            Ok(Surface { points })
        })
        .collect::<Result<Vec<_>>>()?;

    let semantics = resolve_semantics(entry, surfaces.len());
    Ok(MultiSurface { surfaces, semantics })
}
