//! Per-point radius estimation: coarse grid scan, start gate, golden-section
//! refinement and acceptance.

use crate::field::SampleableField;
use crate::frame::{check_frame, FRAME_TOLERANCE};
use crate::tube::TubePoint;

use super::config::{ConfigError, EstimatorConfig, RadiusSeed};
use super::medialness::{self, MedialnessSample, RayFan};
use super::profile::{self, RadiusGrid};
use super::report::{LowConfidence, PointReport, PointStatus, RadiusReport};
use super::search::golden_section_max;

/// Failures that abort a whole estimator call before any point is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// The centerline has no points.
    EmptyCenterline,
    /// The field reports no readable data.
    EmptyField,
    /// Configuration failed validation.
    Config(ConfigError),
    /// A report does not describe the given centerline.
    ReportMismatch {
        /// Centerline length.
        points: usize,
        /// Report length.
        reports: usize,
    },
}

impl std::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCenterline => write!(f, "centerline is empty"),
            Self::EmptyField => write!(f, "field is empty"),
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::ReportMismatch { points, reports } => write!(
                f,
                "report has {} entries for a centerline of {} points",
                reports, points
            ),
        }
    }
}

impl std::error::Error for EstimateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EstimateError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Estimate the radius of every point from `cfg.radius0`.
///
/// Frames must already be populated (see
/// [`compute_tangents_and_normals`](crate::compute_tangents_and_normals)).
/// Radius and medialness are written back onto each point that has a usable
/// frame; the report lists what happened to every point.
pub fn estimate_radii<const D: usize, F>(
    points: &mut [TubePoint<D>],
    field: &F,
    cfg: &EstimatorConfig,
) -> Result<RadiusReport, EstimateError>
where
    F: SampleableField<D> + ?Sized,
{
    estimate_radii_with_seed(points, field, cfg, RadiusSeed::Configured)
}

/// Same as [`estimate_radii`] with an explicit seed policy.
pub fn estimate_radii_with_seed<const D: usize, F>(
    points: &mut [TubePoint<D>],
    field: &F,
    cfg: &EstimatorConfig,
    seed: RadiusSeed,
) -> Result<RadiusReport, EstimateError>
where
    F: SampleableField<D> + ?Sized,
{
    precheck(points, field, cfg)?;

    let reports = points
        .iter_mut()
        .enumerate()
        .map(|(i, p)| estimate_point(field, p, i, cfg, seed))
        .collect();

    Ok(finish(reports))
}

/// Parallel variant of [`estimate_radii_with_seed`]. Each worker writes only
/// its own point, so results match the sequential path exactly.
#[cfg(feature = "parallel")]
pub fn estimate_radii_par<const D: usize, F>(
    points: &mut [TubePoint<D>],
    field: &F,
    cfg: &EstimatorConfig,
    seed: RadiusSeed,
) -> Result<RadiusReport, EstimateError>
where
    F: SampleableField<D> + Sync + ?Sized,
{
    use rayon::prelude::*;

    precheck(points, field, cfg)?;

    let reports = points
        .par_iter_mut()
        .enumerate()
        .map(|(i, p)| estimate_point(field, p, i, cfg, seed))
        .collect();

    Ok(finish(reports))
}

fn precheck<const D: usize, F>(
    points: &[TubePoint<D>],
    field: &F,
    cfg: &EstimatorConfig,
) -> Result<(), EstimateError>
where
    F: SampleableField<D> + ?Sized,
{
    cfg.validate()?;
    if points.is_empty() {
        return Err(EstimateError::EmptyCenterline);
    }
    if field.is_empty() {
        return Err(EstimateError::EmptyField);
    }
    Ok(())
}

fn finish(points: Vec<PointReport>) -> RadiusReport {
    let report = RadiusReport { points };
    tracing::info!(
        "radius estimation: {} points, {} accepted, {} low-confidence, {} skipped",
        report.points.len(),
        report.n_accepted(),
        report.n_low_confidence(),
        report.n_skipped()
    );
    report
}

/// Run the full per-point pipeline on one point.
pub(crate) fn estimate_point<const D: usize, F>(
    field: &F,
    point: &mut TubePoint<D>,
    index: usize,
    cfg: &EstimatorConfig,
    seed: RadiusSeed,
) -> PointReport
where
    F: SampleableField<D> + ?Sized,
{
    if let Some(defect) = check_frame(point, FRAME_TOLERANCE) {
        tracing::warn!("point {}: skipped, frame defect {}", index, defect);
        return PointReport::skipped(index, defect, point.radius);
    }

    let r0 = cfg.seed_radius(seed, point.radius);
    let window = [
        cfg.clamp_radius(r0 - cfg.search_halfwidth),
        cfg.clamp_radius(r0 + cfg.search_halfwidth),
    ];
    let grid = RadiusGrid::from_window(window, cfg.min_radius, cfg.radius_step, r0);
    let fan = RayFan::from_point(point, cfg.n_directions);
    let samples = medialness::scan(field, &fan, &grid, cfg);

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let peak = profile::peak_idx(&values).filter(|_| samples.iter().any(|s| s.valid_rays > 0));
    let response = cfg.store_response.then(|| samples.clone());

    let Some(peak) = peak else {
        tracing::warn!(
            "point {}: field unavailable at all {} candidate radii",
            index,
            grid.len()
        );
        point.radius = r0;
        point.medialness = 0.0;
        return PointReport {
            index,
            status: PointStatus::LowConfidence(LowConfidence::FieldUnavailable),
            seed_radius: r0,
            coarse_radius: r0,
            coarse_medialness: 0.0,
            radius: r0,
            medialness: 0.0,
            coverage: 0.0,
            iterations: 0,
            response,
        };
    };

    let coarse = samples[peak];
    let (best, iterations) = if coarse.value < cfg.thresh_medialness_start {
        (coarse, 0)
    } else {
        refine(field, &fan, &coarse, window, cfg)
    };

    let status = if coarse.value < cfg.thresh_medialness_start {
        PointStatus::LowConfidence(LowConfidence::BelowStartThreshold)
    } else if best.value < cfg.thresh_medialness {
        PointStatus::LowConfidence(LowConfidence::BelowThreshold)
    } else {
        PointStatus::Accepted
    };

    let radius = cfg.clamp_radius(best.radius);
    point.radius = radius;
    point.medialness = best.value;

    tracing::debug!(
        "point {}: seed {:.3} coarse {:.3} ({:.4}) final {:.3} ({:.4}) after {} iterations, {:?}",
        index,
        r0,
        coarse.radius,
        coarse.value,
        radius,
        best.value,
        iterations,
        status
    );

    PointReport {
        index,
        status,
        seed_radius: r0,
        coarse_radius: coarse.radius,
        coarse_medialness: coarse.value,
        radius,
        medialness: best.value,
        coverage: best.coverage(),
        iterations,
        response,
    }
}

/// Golden-section refinement around the coarse peak. Returns the better of
/// the coarse and refined samples.
fn refine<const D: usize, F>(
    field: &F,
    fan: &RayFan<D>,
    coarse: &MedialnessSample,
    window: [f64; 2],
    cfg: &EstimatorConfig,
) -> (MedialnessSample, usize)
where
    F: SampleableField<D> + ?Sized,
{
    let lo = (coarse.radius - cfg.radius_step).max(window[0]);
    let hi = (coarse.radius + cfg.radius_step).min(window[1]);
    let mut scratch = Vec::with_capacity(fan.len());
    let res = golden_section_max(
        |r| medialness::evaluate(field, fan, r, cfg, &mut scratch).value,
        lo,
        hi,
        cfg.radius_tolerance,
        cfg.max_iterations,
    );

    if profile::improves(res.x, res.value, coarse.radius, coarse.value) {
        let refined = medialness::evaluate(field, fan, res.x, cfg, &mut scratch);
        (refined, res.iterations)
    } else {
        (*coarse, res.iterations)
    }
}
