//! Two-pass bridge stitching.
//!
//! Lower bridge levels are stitched first to whatever they touch. Decks are
//! then split at corners (where the boundary switches between stitched and
//! free-standing runs) and the vertices between corners are interpolated.

// Interpolated elevations are rounded to whole centimeters
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use terra_feature::Feature;
use terra_types::{FeatureKind, Point2, RingVertex, distance, is_no_data};
use tracing::{debug, info};

use crate::column::{BucketKey, NodeColumnStore};
use crate::error::StitchResult;
use crate::params::StitchParams;
use crate::vertex::check_adjacency;

/// Elevations lower bridge levels were stitched to, per location.
#[derive(Debug, Default)]
struct BridgeStitchMap {
    heights: HashMap<BucketKey, i32>,
}

impl BridgeStitchMap {
    fn insert(&mut self, p: &Point2<f64>, z: i32) {
        self.heights.insert(BucketKey::new(p), z);
    }

    fn get(&self, p: &Point2<f64>) -> Option<i32> {
        self.heights.get(&BucketKey::new(p)).copied()
    }
}

/// What a deck vertex touches.
#[derive(Debug, Clone, Copy, Default)]
struct Contact {
    /// Elevation the vertex can be stitched to.
    stitched: Option<i32>,
    /// Touches both another deck and a non-bridge feature.
    junction: bool,
}

/// Stitch every bridge to its surroundings.
///
/// Runs after [`stitch_lifted_features`](crate::stitch_lifted_features).
/// Returns the number of bridge vertices that took a neighbour's elevation.
///
/// # Errors
///
/// Returns an error for negative thresholds or unknown adjacency handles.
pub fn stitch_bridges(
    features: &mut [Feature],
    columns: &mut NodeColumnStore,
    params: &StitchParams,
) -> StitchResult<usize> {
    params.validate()?;
    check_adjacency(features)?;
    let threshold = params.threshold_bridge_jump_edges;

    let mut map = BridgeStitchMap::default();
    let mut stitched = 0;

    for f in 0..features.len() {
        if features[f].kind() == FeatureKind::Bridge && !features[f].is_top_level() {
            stitched += stitch_lower_level(features, f, columns, &mut map, threshold);
        }
    }
    for f in 0..features.len() {
        if features[f].kind() == FeatureKind::Bridge && features[f].is_top_level() {
            for ring in 0..features[f].polygon().ring_count() {
                stitched += stitch_deck_ring(features, f, ring, columns, &map, threshold);
            }
        }
    }

    info!(stitched, "Bridge stitching finished");
    Ok(stitched)
}

/// Copy the elevation of a touching non-deck feature onto each vertex of a
/// lower bridge level when the two are within `threshold`.
fn stitch_lower_level(
    features: &mut [Feature],
    f: usize,
    columns: &mut NodeColumnStore,
    map: &mut BridgeStitchMap,
    threshold: i32,
) -> usize {
    let vertices: Vec<(RingVertex, Point2<f64>)> =
        features[f].polygon().vertices().map(|(v, p)| (v, *p)).collect();
    let mut count = 0;
    for (v, p) in vertices {
        let z = features[f].elevation(v);
        let neighbour = features[f]
            .adjacent()
            .iter()
            .map(|g| &features[g.index()])
            .filter(|g| !(g.kind() == FeatureKind::Bridge && g.is_top_level()))
            .filter_map(|g| g.find_point(&p).map(|w| g.elevation(w)))
            .find(|&gz| !is_no_data(gz) && (is_no_data(z) || (z - gz).abs() < threshold));
        if let Some(gz) = neighbour {
            features[f].set_elevation(v, gz);
            map.insert(&p, gz);
            columns.push(&p, gz);
            count += 1;
        }
    }
    count
}

fn contact(features: &[Feature], f: usize, p: &Point2<f64>, z: i32, map: &BridgeStitchMap, threshold: i32) -> Contact {
    let mut deck = false;
    let mut ground = None;
    for g in features[f].adjacent() {
        let g = &features[g.index()];
        let Some(w) = g.find_point(p) else {
            continue;
        };
        if g.kind() == FeatureKind::Bridge {
            deck |= g.is_top_level();
        } else if ground.is_none() {
            ground = Some(g.elevation(w)).filter(|gz| !is_no_data(*gz));
        }
    }
    let near = |gz: i32| is_no_data(z) || (z - gz).abs() < threshold;
    Contact {
        stitched: map.get(p).or(ground.filter(|&gz| near(gz))),
        junction: deck && ground.is_some(),
    }
}

/// Distance-weighted elevation at `p` between `(a, za)` and `(b, zb)`.
fn interpolate(p: &Point2<f64>, a: &Point2<f64>, za: i32, b: &Point2<f64>, zb: i32) -> i32 {
    match (is_no_data(za), is_no_data(zb)) {
        (true, _) => return zb,
        (false, true) => return za,
        (false, false) => {}
    }
    let (da, db) = (distance(p, a), distance(p, b));
    let total = da + db;
    if total <= f64::EPSILON {
        return za;
    }
    ((db / total) * f64::from(za) + (da / total) * f64::from(zb)).round() as i32
}

fn stitch_deck_ring(
    features: &mut [Feature],
    f: usize,
    ring: usize,
    columns: &mut NodeColumnStore,
    map: &BridgeStitchMap,
    threshold: i32,
) -> usize {
    let points: Vec<Point2<f64>> = features[f].polygon().ring(ring).to_vec();
    let n = points.len();
    let at = |i: usize| RingVertex::new(ring, i);
    let contacts: Vec<Contact> = {
        let view: &[Feature] = features;
        (0..n)
            .map(|i| contact(view, f, &points[i], view[f].elevation(at(i)), map, threshold))
            .collect()
    };

    let corners: Vec<usize> = (0..n)
        .filter(|&i| {
            let prev = (i + n - 1) % n;
            contacts[i].stitched.is_some() != contacts[prev].stitched.is_some() || contacts[i].junction
        })
        .collect();
    let mut count = 0;

    if corners.is_empty() {
        // Either free-standing everywhere or stitched everywhere
        for (i, c) in contacts.iter().enumerate() {
            if let Some(z) = c.stitched {
                features[f].set_elevation(at(i), z);
                columns.push(&points[i], z);
                count += 1;
            }
        }
        return count;
    }

    for &c in &corners {
        if let Some(z) = contacts[c].stitched {
            features[f].set_elevation(at(c), z);
            count += 1;
        }
        columns.push(&points[c], features[f].elevation(at(c)));
    }

    let mut walls = false;
    for (k, &start) in corners.iter().enumerate() {
        let end = corners[(k + 1) % corners.len()];
        let steps = match (end + n - start) % n {
            0 => n,
            s => s,
        };
        let start_z = features[f].elevation(at(start));
        let end_z = features[f].elevation(at(end));
        for step in 1..steps {
            let i = (start + step) % n;
            let p = &points[i];
            let local = contacts[i].stitched;
            let z = if contacts[start].stitched.is_some() {
                let interpolated = interpolate(p, &points[start], start_z, &points[end], end_z);
                match local {
                    Some(s) if s < interpolated => {
                        count += 1;
                        s
                    }
                    _ => {
                        walls = true;
                        interpolated
                    }
                }
            } else {
                let prev = (i + n - 1) % n;
                let prev_z = features[f].elevation(at(prev));
                let interpolated = interpolate(p, &points[prev], prev_z, &points[end], end_z);
                match local {
                    Some(s) if (s - interpolated).abs() < threshold => {
                        count += 1;
                        s
                    }
                    _ => {
                        walls = true;
                        interpolated
                    }
                }
            };
            features[f].set_elevation(at(i), z);
            columns.push(p, z);
        }
    }
    if walls {
        features[f].mark_vertical_walls();
    }
    debug!(feature = features[f].id(), ring, corners = corners.len(), "Bridge deck stitched");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_feature::FeatureId;

    fn poly(id: &str, kind: FeatureKind, pts: &[(f64, f64)]) -> Feature {
        let ring = pts.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        Feature::from_rings(id, kind, ring, vec![]).unwrap()
    }

    fn link(features: &mut [Feature]) {
        let n = features.len();
        for i in 0..n {
            let adjacent = (0..n)
                .filter(|&j| j != i && features[i].touches(&features[j]))
                .map(|j| FeatureId(j as u32))
                .collect();
            features[i].set_adjacent(adjacent);
        }
    }

    fn z_at(f: &Feature, x: f64, y: f64) -> i32 {
        f.elevation(f.find_point(&Point2::new(x, y)).unwrap())
    }

    #[test]
    fn test_interpolate() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert_eq!(interpolate(&Point2::new(2.5, 0.0), &a, 100, &b, 200), 125);
        assert_eq!(interpolate(&Point2::new(0.0, 0.0), &a, 100, &b, 200), 100);
        assert_eq!(interpolate(&Point2::new(5.0, 0.0), &a, terra_types::NO_DATA, &b, 200), 200);
    }

    #[test]
    fn test_lower_level_stitched_to_road() {
        let mut features = vec![
            poly("road", FeatureKind::Road, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            poly("under", FeatureKind::Bridge, &[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)])
                .with_top_level(false),
        ];
        features[0].set_all_elevations(100);
        features[1].set_all_elevations(130);
        link(&mut features);
        let mut columns = NodeColumnStore::new();
        let n = stitch_bridges(&mut features, &mut columns, &StitchParams::default()).unwrap();

        assert_eq!(n, 2);
        assert_eq!(z_at(&features[1], 1.0, 0.0), 100);
        assert_eq!(z_at(&features[1], 1.0, 1.0), 100);
        assert_eq!(z_at(&features[1], 2.0, 0.0), 130);
        assert_eq!(columns.get(&Point2::new(1.0, 1.0)), &[100]);
    }

    #[test]
    fn test_lower_level_beyond_threshold_untouched() {
        let mut features = vec![
            poly("road", FeatureKind::Road, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            poly("under", FeatureKind::Bridge, &[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)])
                .with_top_level(false),
        ];
        features[0].set_all_elevations(100);
        features[1].set_all_elevations(400);
        link(&mut features);
        let n = stitch_bridges(&mut features, &mut NodeColumnStore::new(), &StitchParams::default()).unwrap();
        assert_eq!(n, 0);
        assert_eq!(z_at(&features[1], 1.0, 0.0), 400);
    }

    #[test]
    fn test_deck_ramps_down_to_road() {
        let mut features = vec![
            poly("road", FeatureKind::Road, &[(-5.0, 0.0), (0.0, 0.0), (0.0, 2.0), (-5.0, 2.0)]),
            poly(
                "deck",
                FeatureKind::Bridge,
                &[(0.0, 0.0), (4.0, 0.0), (8.0, 0.0), (8.0, 2.0), (4.0, 2.0), (0.0, 2.0)],
            ),
        ];
        features[0].set_all_elevations(500);
        features[1].set_all_elevations(520);
        link(&mut features);
        let mut columns = NodeColumnStore::new();
        let n = stitch_bridges(&mut features, &mut columns, &StitchParams::default()).unwrap();

        let deck = &features[1];
        assert_eq!(z_at(deck, 0.0, 0.0), 500);
        assert_eq!(z_at(deck, 0.0, 2.0), 500);
        assert_eq!(z_at(deck, 4.0, 0.0), 520);
        for (x, y) in [(8.0, 0.0), (8.0, 2.0), (4.0, 2.0)] {
            let z = z_at(deck, x, y);
            assert!((500..=520).contains(&z), "z at ({x}, {y}) = {z}");
        }
        assert!(deck.has_vertical_walls());
        assert_eq!(n, 2);
        assert!(columns.is_resolved(&Point2::new(8.0, 2.0)));
    }

    #[test]
    fn test_free_standing_deck_unchanged() {
        let mut features = vec![poly(
            "deck",
            FeatureKind::Bridge,
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)],
        )];
        features[0].set_all_elevations(700);
        let n = stitch_bridges(&mut features, &mut NodeColumnStore::new(), &StitchParams::default()).unwrap();
        assert_eq!(n, 0);
        assert!(features[0].elevations().iter().flatten().all(|&z| z == 700));
    }
}
