//! Node columns: the distinct elevations recorded at one location.

use std::fmt;

use hashbrown::HashMap;
use terra_types::Point2;

/// Coordinate key shared by every vertex at the same location.
///
/// Coordinates are rounded to millimetres, so vertices read independently
/// from different polygons collide to the same key despite round-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    x: i64,
    y: i64,
}

impl BucketKey {
    /// Key of a 2D location.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // map coordinates stay far below 2^63 mm
    pub fn new(p: &Point2<f64>) -> Self {
        Self {
            x: (p.x * 1000.0).round() as i64,
            y: (p.y * 1000.0).round() as i64,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = |v: i64| if v < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:03} {}{}.{:03}",
            sign(self.x),
            self.x.unsigned_abs() / 1000,
            self.x.unsigned_abs() % 1000,
            sign(self.y),
            self.y.unsigned_abs() / 1000,
            self.y.unsigned_abs() % 1000
        )
    }
}

/// Elevations (cm) recorded per location during stitching.
///
/// Values are appended while stitching and made strictly ascending by
/// [`NodeColumnStore::normalize`]. A location whose column is non-empty has
/// been resolved and is not visited again.
#[derive(Debug, Clone, Default)]
pub struct NodeColumnStore {
    columns: HashMap<BucketKey, Vec<i32>>,
}

impl NodeColumnStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `z` at `p`.
    pub fn push(&mut self, p: &Point2<f64>, z: i32) {
        self.columns.entry(BucketKey::new(p)).or_default().push(z);
    }

    /// Column at `p`, empty if nothing was recorded.
    #[must_use]
    pub fn get(&self, p: &Point2<f64>) -> &[i32] {
        self.columns.get(&BucketKey::new(p)).map_or(&[], Vec::as_slice)
    }

    /// Whether a value was already recorded at `p`.
    #[must_use]
    pub fn is_resolved(&self, p: &Point2<f64>) -> bool {
        !self.get(p).is_empty()
    }

    /// Give `to` the column of `from` when they fall into different buckets.
    ///
    /// Coincident vertices can straddle a millimetre rounding boundary; this
    /// makes both keys resolve to the same levels. An existing column at `to`
    /// is left alone.
    pub fn share(&mut self, from: &Point2<f64>, to: &Point2<f64>) {
        let (from, to) = (BucketKey::new(from), BucketKey::new(to));
        if from == to || self.columns.contains_key(&to) {
            return;
        }
        if let Some(column) = self.columns.get(&from).filter(|c| !c.is_empty()).cloned() {
            self.columns.insert(to, column);
        }
    }

    /// Sort every column and remove duplicate values.
    pub fn normalize(&mut self) {
        for column in self.columns.values_mut() {
            column.sort_unstable();
            column.dedup();
        }
    }

    /// Number of locations with a column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over all columns.
    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &[i32])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Column values in `[lo, hi]` plus both bounds, ascending and unique.
    ///
    /// These are the levels a wall spans at one endpoint of an edge.
    #[must_use]
    pub fn levels(&self, p: &Point2<f64>, lo: i32, hi: i32) -> Vec<i32> {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let mut levels: Vec<i32> = self
            .get(p)
            .iter()
            .copied()
            .filter(|z| (lo..=hi).contains(z))
            .chain([lo, hi])
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }
}
