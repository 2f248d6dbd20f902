//! Medialness response along rays in the normal plane of a centerline point.
//!
//! At a candidate radius `r` every ray `d` in the cross-sectional plane is
//! sampled just inside and just outside the candidate boundary, at
//! `max(r - h, 0)` and `r + h`, and the two samples form a central
//! difference. Ridge extraction keeps the sign (intensity must fall off
//! outward, so the cross-section is an intensity maximum); edge extraction
//! takes the magnitude. Rays with an out-of-bounds sample contribute zero.

use nalgebra::SVector;

use crate::field::SampleableField;
use crate::tube::TubePoint;

use super::config::EstimatorConfig;
use super::profile::{self, RadiusGrid};

/// Medialness evaluated at one radius.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MedialnessSample {
    /// Candidate radius.
    pub radius: f64,
    /// Aggregated response.
    pub value: f64,
    /// Rays with both samples in bounds.
    pub valid_rays: usize,
    /// Rays cast.
    pub total_rays: usize,
}

impl MedialnessSample {
    /// Fraction of rays that could be sampled.
    #[inline]
    pub fn coverage(&self) -> f64 {
        self.valid_rays as f64 / self.total_rays.max(1) as f64
    }
}

/// Unit ray directions spanning the normal plane of one point.
#[derive(Debug, Clone)]
pub(crate) struct RayFan<const D: usize> {
    pub(crate) origin: SVector<f64, D>,
    pub(crate) dirs: Vec<SVector<f64, D>>,
}

impl<const D: usize> RayFan<D> {
    /// `n_directions` rays `cos(t) n1 + sin(t) n2` evenly spaced on the circle;
    /// in 2-D just `+n1` and `-n1`.
    pub(crate) fn from_point(point: &TubePoint<D>, n_directions: usize) -> Self {
        if !TubePoint::<D>::has_normal2() {
            return Self {
                origin: point.position,
                dirs: vec![point.normal1, -point.normal1],
            };
        }

        let n = n_directions.max(1);
        let d_theta = 2.0 * std::f64::consts::PI / n as f64;
        let c_step = d_theta.cos();
        let s_step = d_theta.sin();
        let mut ct = 1.0f64;
        let mut st = 0.0f64;
        let mut dirs = Vec::with_capacity(n);
        for _ in 0..n {
            dirs.push(point.normal1 * ct + point.normal2 * st);
            let next_ct = ct * c_step - st * s_step;
            let next_st = st * c_step + ct * s_step;
            ct = next_ct;
            st = next_st;
        }
        Self {
            origin: point.position,
            dirs,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.dirs.len()
    }
}

/// Evaluate the medialness response of `point` at `radius`.
///
/// The point's frame must already be populated. `radius` is used as given;
/// callers clamp it to the admissible range.
pub fn medialness_at<const D: usize, F>(
    field: &F,
    point: &TubePoint<D>,
    radius: f64,
    cfg: &EstimatorConfig,
) -> MedialnessSample
where
    F: SampleableField<D> + ?Sized,
{
    let fan = RayFan::from_point(point, cfg.n_directions);
    let mut scratch = Vec::with_capacity(fan.len());
    evaluate(field, &fan, radius, cfg, &mut scratch)
}

/// Evaluate one radius on a prepared fan, reusing `scratch` for per-ray values.
pub(crate) fn evaluate<const D: usize, F>(
    field: &F,
    fan: &RayFan<D>,
    radius: f64,
    cfg: &EstimatorConfig,
    scratch: &mut Vec<f64>,
) -> MedialnessSample
where
    F: SampleableField<D> + ?Sized,
{
    let h = cfg.kernel_halfwidth;
    let inner = (radius - h).max(0.0);
    let outer = radius + h;
    let span = outer - inner;

    scratch.clear();
    let mut valid_rays = 0usize;
    for d in &fan.dirs {
        let a = field.sample(&(fan.origin + d * inner));
        let b = field.sample(&(fan.origin + d * outer));
        let resp = match (a, b) {
            (Some(a), Some(b)) if span > 0.0 => {
                valid_rays += 1;
                let diff = (a - b) / span;
                if cfg.extract_ridge {
                    diff
                } else {
                    diff.abs()
                }
            }
            _ => 0.0,
        };
        scratch.push(resp);
    }

    MedialnessSample {
        radius,
        value: profile::aggregate(scratch, &cfg.aggregator),
        valid_rays,
        total_rays: fan.len(),
    }
}

/// Evaluate every radius of a coarse grid.
pub(crate) fn scan<const D: usize, F>(
    field: &F,
    fan: &RayFan<D>,
    grid: &RadiusGrid,
    cfg: &EstimatorConfig,
) -> Vec<MedialnessSample>
where
    F: SampleableField<D> + ?Sized,
{
    let mut scratch = Vec::with_capacity(fan.len());
    grid.radii
        .iter()
        .map(|&r| evaluate(field, fan, r, cfg, &mut scratch))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{Vector2, Vector3};

    use super::*;
    use crate::field::FnField;
    use crate::test_utils::{bright_cylinder_z, on_axis_point};

    #[test]
    fn fan_rays_are_unit_and_in_normal_plane() {
        let p = on_axis_point(Vector3::new(0.0, 0.0, 3.0));
        let fan = RayFan::from_point(&p, 12);
        assert_eq!(fan.len(), 12);
        for d in &fan.dirs {
            assert_abs_diff_eq!(d.norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(d.dot(&p.tangent), 0.0, epsilon = 1e-12);
        }
        let sum: Vector3<f64> = fan.dirs.iter().sum();
        assert_abs_diff_eq!(sum.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn two_dimensional_fan_has_opposite_rays() {
        let mut p = TubePoint::new(Vector2::new(1.0, 1.0));
        p.tangent = Vector2::x();
        p.normal1 = Vector2::y();
        let fan = RayFan::from_point(&p, 16);
        assert_eq!(fan.dirs, vec![Vector2::y(), -Vector2::y()]);
    }

    #[test]
    fn ridge_response_peaks_at_cylinder_radius() {
        let field = bright_cylinder_z(4.0, 1.0);
        let p = on_axis_point(Vector3::zeros());
        let cfg = EstimatorConfig::default();
        let at = |r: f64| medialness_at(&field, &p, r, &cfg).value;
        assert!(at(4.0) > at(3.5));
        assert!(at(4.0) > at(4.5));
        assert!(at(4.0) > at(2.0));
        assert!(at(4.0) > at(7.0));
        assert_abs_diff_eq!(at(4.0), 0.5f64.tanh(), epsilon = 1e-9);
    }

    #[test]
    fn ridge_is_negative_on_dark_tube_while_edge_is_positive() {
        let bright = bright_cylinder_z(3.0, 1.0);
        let dark = FnField::new(move |q: &Vector3<f64>| bright.sample(q).map(|v| 1.0 - v));
        let p = on_axis_point(Vector3::zeros());
        let ridge = EstimatorConfig::default();
        let edge = EstimatorConfig {
            extract_ridge: false,
            ..Default::default()
        };
        let r = medialness_at(&dark, &p, 3.0, &ridge);
        let e = medialness_at(&dark, &p, 3.0, &edge);
        assert!(r.value < 0.0);
        assert_abs_diff_eq!(e.value, -r.value, epsilon = 1e-12);
    }

    #[test]
    fn out_of_bounds_rays_contribute_zero() {
        let inner = bright_cylinder_z(4.0, 1.0);
        // Field exists only for x >= 0: half the rays leave it.
        let half = FnField::new(move |q: &Vector3<f64>| {
            if q.x < -1e-9 {
                None
            } else {
                inner.sample(q)
            }
        });
        let p = on_axis_point(Vector3::zeros());
        let cfg = EstimatorConfig {
            n_directions: 8,
            ..Default::default()
        };
        let full = medialness_at(&inner, &p, 4.0, &cfg);
        let partial = medialness_at(&half, &p, 4.0, &cfg);
        assert_eq!(full.valid_rays, 8);
        assert_eq!(partial.valid_rays, 5);
        assert_abs_diff_eq!(partial.value, full.value * 5.0 / 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(partial.coverage(), 5.0 / 8.0);
    }

    #[test]
    fn scan_covers_every_grid_radius() {
        let field = bright_cylinder_z(2.0, 0.8);
        let p = on_axis_point(Vector3::zeros());
        let cfg = EstimatorConfig::default();
        let grid = RadiusGrid::from_window([0.5, 4.0], 0.5, 0.5, 1.0);
        let fan = RayFan::from_point(&p, cfg.n_directions);
        let samples = scan(&field, &fan, &grid, &cfg);
        let radii: Vec<f64> = samples.iter().map(|s| s.radius).collect();
        assert_eq!(radii, grid.radii);
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(profile::peak_idx(&values), Some(3));
    }
}
