//! Greedy error-driven point insertion.
//!
//! Every candidate point sits in exactly one triangle and is keyed by its
//! vertical distance to that triangle's plane. The worst point is inserted
//! repeatedly; only the points of triangles destroyed by an insertion are
//! relocated and re-keyed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use terra_types::{Point2, Point3};
use tracing::debug;

use crate::result::GreedyResult;
use crate::triangulation::{Location, Triangulation};

/// A candidate point in the priority queue.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    error: f64,
    point: usize,
    stamp: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on error; lower point index first on ties
        self.error
            .partial_cmp(&other.error)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.point.cmp(&self.point))
    }
}

/// Stamp of a point already inserted or discarded.
const CONSUMED: u32 = u32::MAX;

/// Candidate points keyed by error, with per-triangle membership.
struct Queue {
    heap: BinaryHeap<Candidate>,
    members: HashMap<u32, Vec<usize>>,
    stamps: Vec<u32>,
}

impl Queue {
    fn new(len: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(len),
            members: HashMap::new(),
            stamps: vec![0; len],
        }
    }

    /// File point `i` under triangle `t` with a fresh stamp.
    fn assign(&mut self, tin: &Triangulation, points: &[Point3<f64>], i: usize, t: u32) {
        let p = &points[i];
        let error = (p.z - tin.interpolate(t, &Point2::new(p.x, p.y))).abs();
        self.stamps[i] = (self.stamps[i] + 1) % CONSUMED;
        self.members.entry(t).or_default().push(i);
        self.heap.push(Candidate {
            error,
            point: i,
            stamp: self.stamps[i],
        });
    }

    fn is_pending(&self, i: usize) -> bool {
        self.stamps[i] != CONSUMED
    }

    fn consume(&mut self, i: usize) {
        self.stamps[i] = CONSUMED;
    }

    /// Pop the worst pending candidate.
    fn pop(&mut self) -> Option<Candidate> {
        while let Some(c) = self.heap.pop() {
            if self.stamps[c.point] == c.stamp {
                return Some(c);
            }
        }
        None
    }
}

/// Insert the worst-fitting points of `points` into `tin` until every
/// remaining point lies within `threshold` meters (vertically) of the surface.
///
/// Points coinciding with an existing vertex or outside the domain are
/// skipped. With a perfectly flat point set on a flat boundary nothing is
/// inserted for any threshold.
pub fn greedy_insert(tin: &mut Triangulation, points: &[Point3<f64>], threshold: f64) -> GreedyResult {
    let mut result = GreedyResult {
        candidates: points.len(),
        ..GreedyResult::default()
    };

    let mut queue = Queue::new(points.len());
    for (i, p) in points.iter().enumerate() {
        match tin.locate(&Point2::new(p.x, p.y)) {
            Location::Inside(t) | Location::OnEdge(t, _, _) => queue.assign(tin, points, i, t),
            Location::OnVertex(_) => {
                queue.consume(i);
                result.duplicates += 1;
            }
            Location::Outside => {
                queue.consume(i);
                result.outside += 1;
            }
        }
    }

    while let Some(worst) = queue.pop() {
        if worst.error <= threshold {
            result.max_remaining_error = worst.error;
            break;
        }
        queue.consume(worst.point);
        let Some(insertion) = tin.insert_tracked(points[worst.point]) else {
            result.duplicates += 1;
            continue;
        };
        result.inserted += 1;

        // Only points of destroyed triangles need a new home and error
        let mut displaced: Vec<usize> = insertion
            .removed
            .iter()
            .filter_map(|t| queue.members.remove(t))
            .flatten()
            .collect();
        displaced.retain(|&j| queue.is_pending(j));
        displaced.sort_unstable();
        displaced.dedup();

        for j in displaced {
            let p = Point2::new(points[j].x, points[j].y);
            let home = insertion
                .created
                .iter()
                .copied()
                .find(|&t| tin.triangle_contains(t, &p))
                .or_else(|| match tin.locate(&p) {
                    Location::Inside(t) | Location::OnEdge(t, _, _) => Some(t),
                    Location::OnVertex(_) | Location::Outside => None,
                });
            match home {
                Some(t) => queue.assign(tin, points, j, t),
                None => {
                    queue.consume(j);
                    result.duplicates += 1;
                }
            }
        }
    }

    debug!(
        candidates = result.candidates,
        inserted = result.inserted,
        max_error = result.max_remaining_error,
        "Greedy insertion finished"
    );
    result
}

/// Insert every point, in order. Returns the number inserted.
pub fn insert_all(tin: &mut Triangulation, points: &[Point3<f64>]) -> usize {
    points.iter().filter(|p| tin.insert(**p).is_some()).count()
}
