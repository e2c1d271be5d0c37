//! Spatial indexing over building footprints
//!
//! R-tree of building XY envelopes for box and point queries.

use rstar::{RTree, RTreeObject, AABB};

use super::city::City;
use super::types::Bounds;

/// Envelope of one building, pointing back at its position in [`City::buildings`]
#[derive(Clone, Debug)]
pub struct BuildingEnvelope {
    pub index: usize,
    pub bounds: AABB<[f64; 2]>,
}

impl BuildingEnvelope {
    pub fn new(index: usize, bounds: Bounds) -> Self {
        Self {
            index,
            bounds: AABB::from_corners([bounds.xmin, bounds.ymin], [bounds.xmax, bounds.ymax]),
        }
    }
}

impl RTreeObject for BuildingEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl rstar::PointDistance for BuildingEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bounds.distance_2(point)
    }
}

/// Footprint index over the buildings of one city.
///
/// Buildings without any resolved geometry are not indexed.
pub struct BuildingIndex {
    tree: RTree<BuildingEnvelope>,
}

impl BuildingIndex {
    pub fn new(city: &City) -> Self {
        let envelopes = city
            .buildings()
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.bounds().map(|bounds| BuildingEnvelope::new(i, bounds)))
            .collect();
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of buildings whose envelope intersects `bounds`, ascending
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let aabb = AABB::from_corners([bounds.xmin, bounds.ymin], [bounds.xmax, bounds.ymax]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|e| e.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Index of the building whose envelope is closest to `(x, y)`
    pub fn nearest(&self, x: f64, y: f64) -> Option<usize> {
        self.tree.nearest_neighbor(&[x, y]).map(|e| e.index)
    }
}
