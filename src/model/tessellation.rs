//! Surface tessellation using the earcut algorithm
//!
//! Surfaces are planar but arbitrarily oriented in 3D, so each ring is
//! projected onto the coordinate plane that best preserves its area
//! before triangulation.

use super::types::{Mesh, MultiSurface, Point3, Surface};
use crate::parsing::{weld, VertexPool};

/// Newell normal of a ring (not normalized)
fn newell_normal(points: &[Point3]) -> [f64; 3] {
    let mut n = [0.0; 3];
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n[0] += (p.y - q.y) * (p.z + q.z);
        n[1] += (p.z - q.z) * (p.x + q.x);
        n[2] += (p.x - q.x) * (p.y + q.y);
    }
    n
}

/// Triangulate the outer ring of a surface.
///
/// Returns triangles as indices into `surface.points`. A repeated closing
/// point is ignored, and degenerate rings produce no triangles.
pub fn triangulate_surface(surface: &Surface) -> Vec<[usize; 3]> {
    let mut ring = surface.points.as_slice();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring = &ring[..ring.len() - 1];
    }
    if ring.len() < 3 {
        return Vec::new();
    }

    // Drop the axis the normal is most aligned with
    let n = newell_normal(ring);
    let (ax, ay) = if n[2].abs() >= n[0].abs() && n[2].abs() >= n[1].abs() {
        (0, 1)
    } else if n[0].abs() >= n[1].abs() {
        (1, 2)
    } else {
        (0, 2)
    };

    let mut flat_coords: Vec<f64> = Vec::with_capacity(ring.len() * 2);
    for p in ring {
        let c = [p.x, p.y, p.z];
        flat_coords.push(c[ax]);
        flat_coords.push(c[ay]);
    }

    let indices = earcutr::earcut(&flat_coords, &[], 2).unwrap_or_default();
    indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

impl MultiSurface {
    /// Triangulate every surface into one compact mesh
    pub fn to_mesh(&self) -> Mesh {
        let mut points = Vec::new();
        let mut triangles = Vec::new();
        for surface in &self.surfaces {
            let offset = points.len();
            triangles.extend(
                triangulate_surface(surface)
                    .into_iter()
                    .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
            );
            points.extend_from_slice(&surface.points);
        }

        let pool = VertexPool::from_points(points);
        // Indices come from the surfaces themselves, so welding cannot go out of range
        weld(&triangles, &pool).unwrap_or_default()
    }
}
