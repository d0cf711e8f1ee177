//! Bow-tie repair along shared edges.
//!
//! A bow-tie is a shared edge where one feature is above its neighbour at one
//! endpoint and below it at the other, which would make the wall between
//! them cross itself.

use std::cmp::Ordering;

use terra_feature::Feature;
use terra_types::{FeatureKind, RingVertex, is_no_data};
use tracing::{info, warn};

use crate::error::StitchResult;
use crate::vertex::{Incident, check_adjacency};

/// The two features along one shared edge `(a, b)`.
#[derive(Debug, Clone, Copy)]
struct SharedEdge {
    fa: Incident,
    fb: Incident,
    ga: Incident,
    gb: Incident,
}

/// Find the neighbour traversing edge `(a, b)` of feature `f` as `(b, a)`.
pub(crate) fn shared_edge(features: &[Feature], f: usize, a: RingVertex) -> Option<(usize, RingVertex, RingVertex)> {
    let polygon = features[f].polygon();
    let b = polygon.next(a);
    let (pa, pb) = (polygon.vertex(a), polygon.vertex(b));
    features[f].adjacent().iter().find_map(|g| {
        let other = &features[g.index()];
        other.find_segment(pb, pa).map(|gb| (g.index(), other.polygon().next(gb), gb))
    })
}

/// Upper bound on repair sweeps; a repair can open a crossing on an edge
/// already visited in the same sweep.
const MAX_SWEEPS: usize = 32;

/// Repair bow-ties until a full sweep over the features finds none.
///
/// Buildings never take part: their boundary carries the roof height and is
/// never overwritten. Edges with a missing elevation are skipped. Returns the
/// number of repairs made across all sweeps, so a second call on the result
/// returns zero.
///
/// # Errors
///
/// Returns [`StitchError::UnknownNeighbour`](crate::StitchError::UnknownNeighbour)
/// if an adjacency list names a feature outside `features`.
pub fn fix_bowties(features: &mut [Feature]) -> StitchResult<usize> {
    check_adjacency(features)?;
    let mut fixed = 0;
    let mut sweeps = 0;
    loop {
        let repaired = sweep(features);
        sweeps += 1;
        fixed += repaired;
        if repaired == 0 {
            break;
        }
        if sweeps == MAX_SWEEPS {
            warn!(sweeps, "Bow-tie repair did not settle");
            break;
        }
    }
    info!(fixed, sweeps, "Bow-tie repair finished");
    Ok(fixed)
}

/// One pass over every shared edge, in feature order.
fn sweep(features: &mut [Feature]) -> usize {
    let mut fixed = 0;
    for f in 0..features.len() {
        if features[f].kind() == FeatureKind::Building {
            continue;
        }
        let vertices: Vec<RingVertex> = features[f].polygon().vertices().map(|(v, _)| v).collect();
        for a in vertices {
            let Some((g, ga, gb)) = shared_edge(features, f, a) else {
                continue;
            };
            if features[g].kind() == FeatureKind::Building {
                continue;
            }
            let edge = SharedEdge {
                fa: Incident { feature: f, vertex: a },
                fb: Incident {
                    feature: f,
                    vertex: features[f].polygon().next(a),
                },
                ga: Incident { feature: g, vertex: ga },
                gb: Incident { feature: g, vertex: gb },
            };
            if repair(features, edge) {
                fixed += 1;
            }
        }
    }
    fixed
}

fn repair(features: &mut [Feature], e: SharedEdge) -> bool {
    let z = |at: Incident| features[at.feature].elevation(at.vertex);
    let (az, bz, gaz, gbz) = (z(e.fa), z(e.fb), z(e.ga), z(e.gb));
    if [az, bz, gaz, gbz].into_iter().any(is_no_data) {
        return false;
    }
    let crossing = matches!(
        (az.cmp(&gaz), bz.cmp(&gbz)),
        (Ordering::Greater, Ordering::Less) | (Ordering::Less, Ordering::Greater)
    );
    if !crossing {
        return false;
    }

    let a_smaller = (az - gaz).abs() < (bz - gbz).abs();
    let (f_hard, g_hard) = (features[e.fa.feature].is_hard(), features[e.ga.feature].is_hard());
    let (target, z) = match (f_hard, g_hard) {
        (true, false) if a_smaller => (e.ga, az),
        (true, false) => (e.gb, bz),
        (false, true) if a_smaller => (e.fa, gaz),
        (false, true) => (e.fb, gbz),
        // Same hardness: snap to the lower value, never raise
        _ if a_smaller => {
            if az < gaz {
                (e.ga, az)
            } else {
                (e.fa, gaz)
            }
        }
        _ => {
            if bz < gbz {
                (e.gb, bz)
            } else {
                (e.fb, gbz)
            }
        }
    };
    features[target.feature].set_elevation(target.vertex, z);
    true
}
