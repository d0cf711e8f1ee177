//! Road spike detection with an iterative least-squares plane fit.

// Ring sizes are small
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use nalgebra::{Matrix3, Vector3};
use terra_types::Point2;

/// Rings with at most this many vertices are left untouched.
const MIN_RING_VERTICES: usize = 6;

/// Two-sided 95% z-score used as the outlier cut-off.
const Z_95: f64 = 1.96;

/// Plane `z = c0 + c1 * (x - x0) + c2 * (y - y0)`.
#[derive(Debug, Clone, Copy)]
struct Plane {
    origin: Point2<f64>,
    coeffs: Vector3<f64>,
}

impl Plane {
    fn fit(origin: Point2<f64>, pts: &[(Point2<f64>, f64)]) -> Option<Self> {
        let mut ata = Matrix3::zeros();
        let mut atb = Vector3::zeros();
        for (p, z) in pts {
            let row = Vector3::new(1.0, p.x - origin.x, p.y - origin.y);
            ata += row * row.transpose();
            atb += row * *z;
        }
        let coeffs = ata.lu().solve(&atb)?;
        Some(Self { origin, coeffs })
    }

    fn eval(&self, p: &Point2<f64>) -> f64 {
        self.coeffs.x
            + self.coeffs.y * (p.x - self.origin.x)
            + self.coeffs.z * (p.y - self.origin.y)
    }
}

/// Replace spikes in a ring's elevations (cm) by the fitted plane.
///
/// The vertex with the largest absolute residual is removed and the plane
/// refitted while that residual exceeds 1.96 standard deviations of the
/// first fit's residuals, at most `n - 6` times. Removed vertices (or all
/// vertices when `flatten` is set) then take the plane value.
pub(crate) fn detect_outliers(ring: &[Point2<f64>], z: &mut [i32], flatten: bool) {
    let n = ring.len();
    if n <= MIN_RING_VERTICES || z.iter().any(|&v| terra_types::is_no_data(v)) {
        return;
    }
    let origin = ring[0];
    let mut kept: Vec<(usize, (Point2<f64>, f64))> = ring
        .iter()
        .zip(z.iter())
        .map(|(p, &v)| (*p, f64::from(v)))
        .enumerate()
        .collect();

    let mut outliers = Vec::new();
    let mut cutoff = 0.0;
    let mut plane = None;
    for iteration in 0..(n - MIN_RING_VERTICES) {
        let pts: Vec<_> = kept.iter().map(|(_, pz)| *pz).collect();
        let Some(fitted) = Plane::fit(origin, &pts) else {
            break;
        };
        plane = Some(fitted);
        let residuals: Vec<f64> = pts.iter().map(|(p, z)| z - fitted.eval(p)).collect();

        if iteration == 0 {
            let m = residuals.len() as f64;
            let mean = residuals.iter().sum::<f64>() / m;
            let var = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (m - 1.0);
            cutoff = Z_95 * var.sqrt();
        }

        let Some((worst, max)) = residuals
            .iter()
            .map(|r| r.abs())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            break;
        };
        if max > cutoff {
            outliers.push(kept.remove(worst).0);
        } else {
            break;
        }
    }

    let Some(plane) = plane else {
        return;
    };
    if flatten {
        for (p, v) in ring.iter().zip(z.iter_mut()) {
            *v = plane.eval(p).round() as i32;
        }
    } else {
        for i in outliers {
            z[i] = plane.eval(&ring[i]).round() as i32;
        }
    }
}
