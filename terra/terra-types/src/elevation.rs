//! Elevation units.
//!
//! Feature elevations are integer centimeters. [`NO_DATA`] marks a value that
//! has not been computed yet.

// Elevations fit comfortably in i32 centimeters
#![allow(clippy::cast_possible_truncation)]

/// Sentinel for "no elevation computed yet".
pub const NO_DATA: i32 = -9999;

/// Whether a centimeter value is the [`NO_DATA`] sentinel.
#[inline]
#[must_use]
pub const fn is_no_data(cm: i32) -> bool {
    cm == NO_DATA
}

/// Convert meters to rounded centimeters.
#[inline]
#[must_use]
pub fn to_cm(meters: f64) -> i32 {
    (meters * 100.0).round() as i32
}

/// Convert centimeters to meters.
#[inline]
#[must_use]
pub fn to_meters(cm: i32) -> f64 {
    f64::from(cm) / 100.0
}

/// Replace every [`NO_DATA`] entry of a ring with the value of the nearest
/// resolved vertex along the ring (cyclically). Ties prefer the following
/// vertex.
///
/// Returns `false`, leaving the ring untouched, when no vertex is resolved.
pub fn fill_no_data(ring: &mut [i32]) -> bool {
    let n = ring.len();
    if !ring.iter().any(|&z| !is_no_data(z)) {
        return false;
    }
    let source = ring.to_vec();
    for (i, z) in ring.iter_mut().enumerate() {
        if !is_no_data(*z) {
            continue;
        }
        for step in 1..n {
            let next = source[(i + step) % n];
            if !is_no_data(next) {
                *z = next;
                break;
            }
            let prev = source[(i + n - step) % n];
            if !is_no_data(prev) {
                *z = prev;
                break;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip_units() {
        assert_eq!(to_cm(12.346), 1235);
        assert_eq!(to_cm(-0.004), 0);
        assert_relative_eq!(to_meters(1235), 12.35);
    }

    #[test]
    fn test_fill_no_data_nearest() {
        let mut ring = [100, NO_DATA, NO_DATA, NO_DATA, 200, NO_DATA];
        assert!(fill_no_data(&mut ring));
        // index 1 is next to 100, index 2 is a tie (prefers next = 200)
        assert_eq!(ring, [100, 100, 200, 200, 200, 100]);
    }

    #[test]
    fn test_fill_no_data_empty_ring() {
        let mut ring = [NO_DATA; 4];
        assert!(!fill_no_data(&mut ring));
        assert!(ring.iter().all(|&z| is_no_data(z)));
    }

    #[test]
    fn test_sentinel() {
        assert!(is_no_data(NO_DATA));
        assert!(!is_no_data(0));
    }
}
