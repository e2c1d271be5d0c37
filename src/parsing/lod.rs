//! Level-of-detail selection
//!
//! A City Object may carry several geometries at different LODs. Exactly
//! one is picked per object: the closest LOD at or below the target,
//! falling back to every candidate when nothing at or below it exists,
//! then a representation preference breaks ties.

use super::records::GeometryEntry;

/// Choose one geometry entry for a target LOD.
///
/// - no candidates: `None`
/// - a single candidate is returned whatever its LOD
/// - otherwise the candidates at the highest LOD in `0..=target_lod` are
///   collected; when there are none, all candidates are used
/// - among several, the first surface-family (or solid-family, when
///   `prefer_surface` is false) entry wins, else the first one
///
/// A match at LOD 0 is kept; it is not widened to the full candidate list.
pub fn select(candidates: &[GeometryEntry], target_lod: i32, prefer_surface: bool) -> Option<&GeometryEntry> {
    match candidates {
        [] => return None,
        [only] => return Some(only),
        _ => {}
    }

    // Same result as stepping down from target_lod one LOD at a time
    let matched = candidates.iter().map(|g| g.lod).filter(|&l| (0..=target_lod).contains(&l)).max();
    let pool: Vec<&GeometryEntry> = match matched {
        Some(lod) => candidates.iter().filter(|g| g.lod == lod).collect(),
        None => candidates.iter().collect(),
    };

    if let [only] = pool.as_slice() {
        return Some(*only);
    }

    pool.iter()
        .copied()
        .find(|g| {
            if prefer_surface {
                g.kind.is_surface_family()
            } else {
                g.kind.is_solid_family()
            }
        })
        .or_else(|| pool.first().copied())
}
