//! Core geometry types for resolved city models
//!
//! Points, surfaces, multi-surfaces, meshes and 2D bounds. Everything here
//! holds materialized coordinates; index references into the vertex pool
//! never leave the parsing stage.

use serde::Serialize;

/// Free-form semantic object attached to a surface (`{"type": "RoofSurface", ...}`)
pub type SemanticTags = serde_json::Map<String, serde_json::Value>;

/// A 3D point in document (transformed) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

/// Axis-aligned 2D box (XY only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Bounds {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    /// Envelope of a set of points, or `None` for an empty iterator
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut bounds: Option<Bounds> = None;
        for p in points {
            bounds = Some(match bounds {
                Some(b) => b.expanded_to(p),
                None => Bounds::new(p.x, p.y, p.x, p.y),
            });
        }
        bounds
    }

    pub fn expanded_to(self, p: &Point3) -> Self {
        Self {
            xmin: self.xmin.min(p.x),
            ymin: self.ymin.min(p.y),
            xmax: self.xmax.max(p.x),
            ymax: self.ymax.max(p.y),
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// A planar polygon described by its outer ring.
///
/// Hole rings are validated while parsing but not kept; consumers rely on
/// surfaces being hole-free.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Surface {
    pub points: Vec<Point3>,
}

/// An ordered collection of surfaces with optional per-surface semantics
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MultiSurface {
    pub surfaces: Vec<Surface>,
    /// Either empty (no semantics in the source) or one entry per surface
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub semantics: Vec<Option<SemanticTags>>,
}

impl MultiSurface {
    /// Semantic object of the surface at `index`, if any
    pub fn semantic(&self, index: usize) -> Option<&SemanticTags> {
        self.semantics.get(index).and_then(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// All points of all surfaces, in surface order
    pub fn points(&self) -> impl Iterator<Item = &Point3> {
        self.surfaces.iter().flat_map(|s| s.points.iter())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points())
    }
}

/// Compact triangle mesh.
///
/// Every face index is below `vertices.len()` and every vertex is used by
/// at least one face. Only the welder and the tessellator build meshes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Mesh {
    vertices: Vec<Point3>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub(crate) fn from_compact(vertices: Vec<Point3>, faces: Vec<[usize; 3]>) -> Self {
        debug_assert!(faces.iter().flatten().all(|&i| i < vertices.len()));
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            Point3::new(1.0, 5.0, 0.0),
            Point3::new(-2.0, 3.0, 9.0),
            Point3::new(4.0, -1.0, 2.0),
        ];
        let b = Bounds::from_points(&pts).unwrap();
        assert_eq!(b, Bounds::new(-2.0, -1.0, 4.0, 5.0));
        assert_eq!(b.width(), 6.0);
        assert!(Bounds::from_points(&Vec::<Point3>::new()).is_none());
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Bounds::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!a.intersects(&Bounds::new(10.5, 0.0, 20.0, 5.0)));
    }

    #[test]
    fn test_semantic_lookup_without_semantics() {
        let ms = MultiSurface {
            surfaces: vec![Surface::default()],
            semantics: Vec::new(),
        };
        assert!(ms.semantic(0).is_none());
    }
}
