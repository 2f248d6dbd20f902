//! Post-estimation smoothing of radii along the centerline.

use crate::tube::TubePoint;

use super::config::{self, EstimatorConfig};
use super::estimate::EstimateError;
use super::report::{PointStatus, RadiusReport};

/// Gaussian-smooth radii along the point index.
///
/// Only points whose status is `Accepted` contribute; every point with an
/// estimate (accepted or low-confidence) receives the weighted average of
/// the accepted radii within `3 * sigma` indices. Skipped points and points
/// with no accepted neighbour are left as they are. Results are clamped to
/// `[min_radius, max_radius]`. Returns how many radii changed.
pub fn smooth_radii<const D: usize>(
    points: &mut [TubePoint<D>],
    report: &RadiusReport,
    sigma: f64,
    cfg: &EstimatorConfig,
) -> Result<usize, EstimateError> {
    if points.len() != report.points.len() {
        return Err(EstimateError::ReportMismatch {
            points: points.len(),
            reports: report.points.len(),
        });
    }
    config::positive("sigma", sigma)?;

    // Saturating cast; the window never needs to span more than the centerline.
    let reach = ((3.0 * sigma).ceil() as usize).min(points.len());
    let source: Vec<Option<f64>> = points
        .iter()
        .zip(&report.points)
        .map(|(p, r)| (r.status == PointStatus::Accepted).then_some(p.radius))
        .collect();

    let mut changed = 0usize;
    for (i, (point, entry)) in points.iter_mut().zip(&report.points).enumerate() {
        if !entry.status.has_estimate() {
            continue;
        }
        let lo = i.saturating_sub(reach);
        let hi = i.saturating_add(reach).min(source.len() - 1);
        let mut sum = 0.0;
        let mut wsum = 0.0;
        for (j, r) in source.iter().enumerate().take(hi + 1).skip(lo) {
            if let Some(r) = r {
                // Scaled distance first: `sigma * sigma` can underflow.
                let u = (j as f64 - i as f64) / sigma;
                let w = (-0.5 * u * u).exp();
                sum += w * r;
                wsum += w;
            }
        }
        let mean = sum / wsum;
        if wsum <= 0.0 || !mean.is_finite() {
            continue;
        }
        let r = cfg.clamp_radius(mean);
        if r != point.radius {
            point.radius = r;
            changed += 1;
        }
    }

    tracing::debug!("smoothed {} of {} radii (sigma {})", changed, points.len(), sigma);
    Ok(changed)
}
