//! Vertex pass: resolve the elevation(s) at every shared boundary vertex.
//!
//! Each location is resolved once, by the first non-bridge feature that
//! reaches it; later visitors find its node column populated and move on.

// Feature counts stay far below u32::MAX
#![allow(clippy::cast_possible_truncation)]

use terra_feature::{Feature, FeatureId};
use terra_types::{FeatureKind, Point2, RingVertex, is_no_data};
use tracing::info;

use crate::column::NodeColumnStore;
use crate::error::{StitchError, StitchResult};
use crate::params::StitchParams;
use crate::result::StitchSummary;

/// One boundary vertex of one feature of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Incident {
    pub feature: usize,
    pub vertex: RingVertex,
}

/// A participant of a location shared by three or more features.
#[derive(Debug, Clone, Copy)]
struct Entry {
    at: Incident,
    z: i32,
}

/// Check that every adjacency handle addresses a feature of the arena.
pub(crate) fn check_adjacency(features: &[Feature]) -> StitchResult<()> {
    let len = features.len();
    for (i, f) in features.iter().enumerate() {
        if let Some(&neighbour) = f.adjacent().iter().find(|n| n.index() >= len) {
            return Err(StitchError::UnknownNeighbour {
                feature: FeatureId(i as u32),
                neighbour,
                len,
            });
        }
    }
    Ok(())
}

/// Vertices of the neighbours of feature `f` coincident with `p`.
pub(crate) fn star(features: &[Feature], f: usize, p: &Point2<f64>) -> Vec<Incident> {
    features[f]
        .adjacent()
        .iter()
        .flat_map(|g| {
            features[g.index()]
                .find_points(p)
                .into_iter()
                .map(move |vertex| Incident {
                    feature: g.index(),
                    vertex,
                })
        })
        .collect()
}

/// Rounded mean of elevations.
pub(crate) fn mean(values: &[i32]) -> i32 {
    if values.is_empty() {
        return terra_types::NO_DATA;
    }
    let sum: i64 = values.iter().map(|&z| i64::from(z)).sum();
    #[allow(clippy::cast_precision_loss)]
    let avg = sum as f64 / values.len() as f64;
    avg.round() as i32
}

/// Resolve every shared boundary vertex of every non-bridge feature.
///
/// Mutates feature elevations, marks features needing vertical walls and
/// fills `columns` with the distinct elevations at each resolved location.
/// Bridges are handled afterwards by [`stitch_bridges`](crate::stitch_bridges).
///
/// # Errors
///
/// Returns [`StitchError::InvalidThreshold`] for negative thresholds and
/// [`StitchError::UnknownNeighbour`] if an adjacency list names a feature
/// outside `features`.
pub fn stitch_lifted_features(
    features: &mut [Feature],
    columns: &mut NodeColumnStore,
    params: &StitchParams,
) -> StitchResult<StitchSummary> {
    params.validate()?;
    check_adjacency(features)?;

    let mut stitcher = Stitcher {
        features,
        columns,
        threshold: params.threshold_jump_edges,
        summary: StitchSummary::default(),
    };

    for f in 0..stitcher.features.len() {
        if stitcher.features[f].kind() == FeatureKind::Bridge {
            continue;
        }
        let vertices: Vec<(RingVertex, Point2<f64>)> = stitcher.features[f]
            .polygon()
            .vertices()
            .map(|(v, p)| (v, *p))
            .collect();
        for (vertex, p) in vertices {
            if stitcher.columns.is_resolved(&p) {
                continue;
            }
            let own = Incident { feature: f, vertex };
            let star = star(stitcher.features, f, &p);
            let coincident: Vec<Point2<f64>> = star
                .iter()
                .map(|at| *stitcher.features[at.feature].polygon().vertex(at.vertex))
                .collect();
            match star.as_slice() {
                [] => stitcher.isolated(own, &p),
                [other] => stitcher.degree_one(own, *other, &p),
                _ => stitcher.degree_many(own, &star, &p),
            }
            for q in &coincident {
                stitcher.columns.share(&p, q);
            }
        }
    }

    let summary = stitcher.summary;
    info!(
        locations = summary.locations,
        averaged = summary.averaged,
        snapped = summary.snapped,
        jumps = summary.jumps,
        multi = summary.multi,
        isolated = summary.isolated,
        "Vertex stitching finished"
    );
    Ok(summary)
}

struct Stitcher<'a> {
    features: &'a mut [Feature],
    columns: &'a mut NodeColumnStore,
    threshold: i32,
    summary: StitchSummary,
}

impl Stitcher<'_> {
    fn kind(&self, at: Incident) -> FeatureKind {
        self.features[at.feature].kind()
    }

    fn is_hard(&self, at: Incident) -> bool {
        self.features[at.feature].is_hard()
    }

    fn z(&self, at: Incident) -> i32 {
        self.features[at.feature].elevation(at.vertex)
    }

    fn set_z(&mut self, at: Incident, z: i32) {
        self.features[at.feature].set_elevation(at.vertex, z);
    }

    fn base(&self, at: Incident) -> i32 {
        self.features[at.feature].base_height()
    }

    fn wall(&mut self, feature: usize) {
        self.features[feature].mark_vertical_walls();
    }

    /// A building corner nobody else touches still carries its wall.
    fn isolated(&mut self, own: Incident, p: &Point2<f64>) {
        if self.kind(own) != FeatureKind::Building {
            return;
        }
        self.wall(own.feature);
        let (roof, base) = (self.z(own), self.base(own));
        self.columns.push(p, roof);
        self.columns.push(p, base);
        self.summary.isolated += 1;
    }

    fn degree_one(&mut self, a: Incident, b: Incident, p: &Point2<f64>) {
        self.summary.locations += 1;
        if self.kind(b) == FeatureKind::Bridge {
            // The bridge pass and the wall builder need this level
            let z = self.z(a);
            self.columns.push(p, z);
            return;
        }
        if !self.is_hard(a) && !self.is_hard(b) {
            self.average(a, b, p);
        } else {
            self.jump_edge(a, b, p);
        }
    }

    fn average(&mut self, a: Incident, b: Incident, p: &Point2<f64>) {
        let (za, zb) = (self.z(a), self.z(b));
        let z = match (is_no_data(za), is_no_data(zb)) {
            (true, true) => return,
            (true, false) => zb,
            (false, true) => za,
            (false, false) => mean(&[za, zb]),
        };
        self.set_z(a, z);
        self.set_z(b, z);
        self.columns.push(p, z);
        self.summary.averaged += 1;
    }

    fn jump_edge(&mut self, a: Incident, b: Incident, p: &Point2<f64>) {
        let (ka, kb) = (self.kind(a), self.kind(b));
        match (ka == FeatureKind::Building, kb == FeatureKind::Building) {
            (true, true) => {
                self.wall(a.feature);
                self.wall(b.feature);
                for z in [self.z(a), self.z(b), self.base(a), self.base(b)] {
                    self.columns.push(p, z);
                }
                self.summary.jumps += 1;
            }
            (true, false) => self.against_building(a, b, p),
            (false, true) => self.against_building(b, a, p),
            (false, false) => self.jump_edge_plain(a, b, p),
        }
    }

    /// `other` meets `building`: it sits on the building floor unless it is water.
    fn against_building(&mut self, building: Incident, other: Incident, p: &Point2<f64>) {
        let (base, roof, z) = (self.base(building), self.z(building), self.z(other));
        self.wall(building.feature);
        self.wall(other.feature);
        self.columns.push(p, roof);
        self.columns.push(p, base);
        if self.kind(other) == FeatureKind::Water || is_no_data(base) {
            self.columns.push(p, z);
            self.summary.jumps += 1;
        } else {
            self.set_z(other, base);
            self.summary.snapped += 1;
        }
    }

    fn jump_edge_plain(&mut self, a: Incident, b: Incident, p: &Point2<f64>) {
        let (za, zb) = (self.z(a), self.z(b));
        match (is_no_data(za), is_no_data(zb)) {
            (true, true) => return,
            (true, false) => return self.snap(a, zb, p),
            (false, true) => return self.snap(b, za, p),
            (false, false) => {}
        }

        if (za - zb).abs() < self.threshold {
            if self.kind(a) == self.kind(b) {
                let z = mean(&[za, zb]);
                self.set_z(a, z);
                self.set_z(b, z);
                self.columns.push(p, z);
                self.summary.averaged += 1;
                return;
            }
            if !self.is_hard(a) {
                return self.snap(a, zb, p);
            }
            if !self.is_hard(b) {
                return self.snap(b, za, p);
            }
        }

        self.wall(a.feature);
        self.wall(b.feature);
        self.columns.push(p, za);
        self.columns.push(p, zb);
        self.summary.jumps += 1;
    }

    fn snap(&mut self, at: Incident, z: i32, p: &Point2<f64>) {
        self.set_z(at, z);
        self.columns.push(p, z);
        self.summary.snapped += 1;
    }

    fn degree_many(&mut self, own: Incident, star: &[Incident], p: &Point2<f64>) {
        self.summary.locations += 1;
        self.summary.multi += 1;

        let level = |s: &Self, at: Incident| {
            if s.kind(at) == FeatureKind::Building {
                s.base(at)
            } else {
                s.z(at)
            }
        };
        let mut entries = vec![Entry {
            at: own,
            z: level(self, own),
        }];
        for &at in star {
            if self.kind(at) == FeatureKind::Bridge {
                self.wall(own.feature);
            } else {
                entries.push(Entry {
                    at,
                    z: level(self, at),
                });
            }
        }

        let has_building = entries.iter().any(|e| self.kind(e.at) == FeatureKind::Building);
        if has_building {
            self.merge_with_buildings(&mut entries, p);
        } else if !self.merge_levels(&mut entries) {
            return;
        }

        let mut previous = None;
        for e in &entries {
            if self.kind(e.at) != FeatureKind::Building {
                self.set_z(e.at, e.z);
            }
            if previous != Some(e.z) && !is_no_data(e.z) {
                self.columns.push(p, e.z);
                previous = Some(e.z);
            }
        }
    }

    /// Everything but water sits on the highest building floor.
    fn merge_with_buildings(&mut self, entries: &mut [Entry], p: &Point2<f64>) {
        let floor = entries
            .iter()
            .filter(|e| self.kind(e.at) == FeatureKind::Building)
            .map(|e| e.z)
            .filter(|z| !is_no_data(*z))
            .max();
        let has_water = entries.iter().any(|e| self.kind(e.at) == FeatureKind::Water);

        for e in entries.iter_mut() {
            match self.kind(e.at) {
                FeatureKind::Building => {
                    let roof = self.features[e.at.feature].roof_height();
                    self.columns.push(p, e.z);
                    self.columns.push(p, roof);
                    self.wall(e.at.feature);
                }
                FeatureKind::Water => self.wall(e.at.feature),
                _ => {
                    if let Some(floor) = floor {
                        e.z = floor;
                    }
                    if has_water {
                        self.wall(e.at.feature);
                    }
                }
            }
        }
    }

    /// Merge the levels of a location without buildings.
    ///
    /// Returns false when no participant has an elevation.
    fn merge_levels(&mut self, entries: &mut [Entry]) -> bool {
        entries.sort_by_key(|e| e.z);
        let Some(lowest) = entries.iter().map(|e| e.z).find(|z| !is_no_data(*z)) else {
            return false;
        };
        // Sentinels take the value of their sorted neighbour
        for e in entries.iter_mut().filter(|e| is_no_data(e.z)) {
            e.z = lowest;
        }

        let n = entries.len();
        let mut i = 0;
        while i < n {
            let mut last = i;
            for j in i + 1..n {
                let (zi, zj) = (entries[i].z, entries[j].z);
                if (zi - zj).abs() < self.threshold {
                    last = j;
                    let (ei, ej) = (entries[i].at, entries[j].at);
                    if self.kind(ei) == self.kind(ej) {
                        entries[j].z = zi;
                    } else if self.is_hard(ei) {
                        if self.is_hard(ej) {
                            match zi.cmp(&zj) {
                                std::cmp::Ordering::Greater => self.wall(ei.feature),
                                std::cmp::Ordering::Less => self.wall(ej.feature),
                                std::cmp::Ordering::Equal => {}
                            }
                        } else {
                            entries[j].z = zi;
                        }
                    } else if self.is_hard(ej) {
                        entries[i].z = zj;
                    }
                } else {
                    self.wall(entries[j].at.feature);
                }
            }

            if last != i {
                let (first_soft, last_soft) =
                    (!self.is_hard(entries[i].at), !self.is_hard(entries[last].at));
                if first_soft && last_soft {
                    let run: Vec<i32> = entries[i..=last].iter().map(|e| e.z).collect();
                    let z = mean(&run);
                    for e in &mut entries[i..=last] {
                        e.z = z;
                    }
                } else if first_soft {
                    let z = entries[last].z;
                    for e in &mut entries[i..last] {
                        e.z = z;
                    }
                }
                i = last;
            }
            i += 1;
        }
        true
    }
}
