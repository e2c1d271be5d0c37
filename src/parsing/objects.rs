//! Object graph construction
//!
//! Walks the flat `CityObjects` map once: root objects are classified by
//! type, children listed by root buildings become their parts, and each
//! object's geometry is selected by LOD and resolved against the pool.
//! Parent edges are never followed, so the walk terminates on any input.

use std::collections::HashMap;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use super::boundaries;
use super::lod;
use super::records::{CityObjectRecord, CityObjectType};
use super::vertices::VertexPool;
use super::LoadOptions;
use crate::error::CityJsonError;
use crate::model::{Building, BuildingPart, LodGeometry, Warning};

/// Output of the graph stage
#[derive(Debug, Default)]
pub struct ObjectGraph<'a> {
    /// Root buildings in document order
    pub buildings: Vec<Building>,
    /// Root `TINRelief` records, in document order, not yet welded
    pub terrain_candidates: Vec<&'a CityObjectRecord>,
    pub warnings: Vec<Warning>,
}

/// A root building with the child records it ended up owning
struct BuildingPlan<'a> {
    record: &'a CityObjectRecord,
    parts: Vec<&'a CityObjectRecord>,
}

pub struct ObjectGraphBuilder<'a> {
    objects: &'a IndexMap<String, CityObjectRecord>,
    pool: &'a VertexPool,
    options: &'a LoadOptions,
}

impl<'a> ObjectGraphBuilder<'a> {
    pub fn new(
        objects: &'a IndexMap<String, CityObjectRecord>,
        pool: &'a VertexPool,
        options: &'a LoadOptions,
    ) -> Self {
        Self { objects, pool, options }
    }

    pub fn build(&self) -> ObjectGraph<'a> {
        let mut graph = ObjectGraph::default();
        let mut roots: Vec<&'a CityObjectRecord> = Vec::new();

        for record in self.objects.values().filter(|r| r.is_root()) {
            match &record.object_type {
                CityObjectType::Building => roots.push(record),
                CityObjectType::TINRelief => graph.terrain_candidates.push(record),
                CityObjectType::BuildingPart => {
                    graph.warnings.push(Warning::OrphanBuildingPart { id: record.id.clone() })
                }
                CityObjectType::Other(name) => graph.warnings.push(Warning::UnsupportedObject {
                    id: record.id.clone(),
                    source: CityJsonError::UnsupportedObjectType(name.clone()),
                }),
            }
        }

        let plans = self.assign_parts(&roots, &mut graph.warnings);
        debug!(
            roots = plans.len(),
            parts = plans.iter().map(|p| p.parts.len()).sum::<usize>(),
            terrain = graph.terrain_candidates.len(),
            "classified city objects"
        );

        let resolved: Vec<(Building, Vec<Warning>)> = if self.options.parallel {
            plans.par_iter().map(|plan| self.build_building(plan)).collect()
        } else {
            plans.iter().map(|plan| self.build_building(plan)).collect()
        };

        for (building, warnings) in resolved {
            graph.buildings.push(building);
            graph.warnings.extend(warnings);
        }
        graph
    }

    /// Give each listed child to the first root building that claims it.
    ///
    /// Root buildings own themselves, so a building listed as a child of
    /// another (or of itself) is never turned into a part.
    fn assign_parts(&self, roots: &[&'a CityObjectRecord], warnings: &mut Vec<Warning>) -> Vec<BuildingPlan<'a>> {
        let mut owners: HashMap<&'a str, &'a str> =
            roots.iter().map(|r| (r.id.as_str(), r.id.as_str())).collect();

        roots
            .iter()
            .map(|&record| {
                let mut parts = Vec::new();
                for child_id in &record.children {
                    let Some(child) = self.objects.get(child_id) else {
                        warnings.push(Warning::MissingChild {
                            parent: record.id.clone(),
                            child: child_id.clone(),
                        });
                        continue;
                    };
                    if let Some(owner) = owners.get(child.id.as_str()) {
                        warnings.push(Warning::ChildAlreadyOwned {
                            parent: record.id.clone(),
                            child: child_id.clone(),
                            owner: owner.to_string(),
                        });
                        continue;
                    }
                    owners.insert(child.id.as_str(), record.id.as_str());
                    parts.push(child);
                }
                BuildingPlan { record, parts }
            })
            .collect()
    }

    fn build_building(&self, plan: &BuildingPlan<'a>) -> (Building, Vec<Warning>) {
        let mut warnings = Vec::new();
        let record = plan.record;

        let (geometry, errors) = self.resolve_geometry(record);
        warnings.extend(errors.iter().map(|e| Warning::GeometryResolution {
            id: record.id.clone(),
            source: e.clone(),
        }));

        let parts = plan
            .parts
            .iter()
            .map(|child| {
                let (geometry, errors) = self.resolve_geometry(child);
                warnings.extend(errors.iter().map(|e| Warning::GeometryResolution {
                    id: child.id.clone(),
                    source: e.clone(),
                }));
                BuildingPart::new(
                    child.id.clone(),
                    record.id.clone(),
                    child.attributes.clone(),
                    geometry,
                    errors,
                )
            })
            .collect();

        let building = Building::new(record.id.clone(), record.attributes.clone(), geometry, parts, errors);
        (building, warnings)
    }

    /// Select and resolve one geometry per requested LOD.
    ///
    /// The result is keyed by the LOD of the winning entry, which may be
    /// lower than the requested one. Entries that failed to decode are
    /// reported first and take no part in selection.
    fn resolve_geometry(&self, record: &CityObjectRecord) -> (LodGeometry, Vec<CityJsonError>) {
        let mut geometry = LodGeometry::new();
        let mut errors = record.geometry_errors.clone();

        for &target in &self.options.lods {
            let Some(entry) = lod::select(&record.geometry, target, self.options.prefer_surface) else {
                continue;
            };
            if geometry.contains_key(&entry.lod) {
                continue;
            }
            match boundaries::resolve(entry, self.pool) {
                Ok(ms) => {
                    geometry.insert(entry.lod, ms);
                }
                Err(e) => {
                    if !errors.contains(&e) {
                        errors.push(e);
                    }
                }
            }
        }
        (geometry, errors)
    }
}
