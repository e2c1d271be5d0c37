//! Shared vertex pool
//!
//! CityJSON stores every coordinate once in a document-wide `vertices`
//! array and references it by index from all boundaries. The pool applies
//! the document transform up front and is read-only afterwards.

use serde::Deserialize;

use crate::error::{CityJsonError, Result};
use crate::model::Point3;

/// `transform` member as found in the document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransform {
    pub scale: Option<Vec<f64>>,
    pub translate: Option<Vec<f64>>,
}

/// Affine transform applied to raw vertices: `point = raw * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: [f64; 3],
    pub translate: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: [1.0, 1.0, 1.0],
            translate: [0.0, 0.0, 0.0],
        }
    }
}

fn triple(field: &'static str, values: &[f64]) -> Result<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(CityJsonError::MalformedTransform { field, len: values.len() }),
    }
}

impl Transform {
    /// Build from the raw member, defaulting whichever half is absent
    pub fn from_raw(raw: Option<&RawTransform>) -> Result<Self> {
        let mut transform = Transform::default();
        if let Some(raw) = raw {
            if let Some(scale) = &raw.scale {
                transform.scale = triple("scale", scale)?;
            }
            if let Some(translate) = &raw.translate {
                transform.translate = triple("translate", translate)?;
            }
        }
        Ok(transform)
    }

    pub fn apply(&self, raw: &[f64; 3]) -> Point3 {
        Point3::new(
            raw[0] * self.scale[0] + self.translate[0],
            raw[1] * self.scale[1] + self.translate[1],
            raw[2] * self.scale[2] + self.translate[2],
        )
    }
}

/// Transformed document vertices, addressed by their original index
#[derive(Debug, Clone, Default)]
pub struct VertexPool {
    points: Vec<Point3>,
}

impl VertexPool {
    pub fn build(raw_vertices: &[[f64; 3]], transform: &Transform) -> Self {
        Self {
            points: raw_vertices.iter().map(|v| transform.apply(v)).collect(),
        }
    }

    /// Wrap already transformed points
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Result<Point3> {
        self.points
            .get(index)
            .copied()
            .ok_or(CityJsonError::IndexOutOfRange { index, len: self.points.len() })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }
}
