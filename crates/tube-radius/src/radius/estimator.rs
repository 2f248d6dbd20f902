//! High-level estimation API.
//!
//! [`RadiusEstimator`] owns a validated [`EstimatorConfig`] and exposes one
//! getter/setter pair per parameter. Setters validate before storing, so an
//! estimator never holds a configuration that [`EstimatorConfig::validate`]
//! would reject.

use crate::field::SampleableField;
use crate::tube::TubePoint;

use super::config::{self, AngularAggregator, ConfigError, EstimatorConfig, RadiusSeed};
use super::estimate::{self, EstimateError};
use super::report::RadiusReport;

/// Primary radius estimation interface.
///
/// Create once, run on many centerlines.
///
/// # Examples
///
/// ```
/// use nalgebra::Vector3;
/// use tube_radius::{compute_tangents_and_normals, FnField, RadiusEstimator, TubePoint};
///
/// let field = FnField::new(|p: &Vector3<f64>| {
///     Some(0.5 * (1.0 - (p.x.hypot(p.y) - 3.0).tanh()))
/// });
/// let mut points: Vec<TubePoint<3>> = (0..5)
///     .map(|k| TubePoint::new(Vector3::new(0.0, 0.0, k as f64)))
///     .collect();
/// compute_tangents_and_normals(&mut points).unwrap();
///
/// let mut estimator = RadiusEstimator::new();
/// estimator.set_radius0(2.0).unwrap();
/// let report = estimator.estimate(&mut points, &field).unwrap();
/// assert_eq!(report.n_accepted(), 5);
/// assert!((points[2].radius - 3.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusEstimator {
    config: EstimatorConfig,
}

impl RadiusEstimator {
    /// Create an estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Access the current configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate radii seeded from [`radius0`](Self::radius0).
    pub fn estimate<const D: usize, F>(
        &self,
        points: &mut [TubePoint<D>],
        field: &F,
    ) -> Result<RadiusReport, EstimateError>
    where
        F: SampleableField<D> + ?Sized,
    {
        estimate::estimate_radii(points, field, &self.config)
    }

    /// Estimate radii with an explicit seed policy.
    pub fn estimate_with_seed<const D: usize, F>(
        &self,
        points: &mut [TubePoint<D>],
        field: &F,
        seed: RadiusSeed,
    ) -> Result<RadiusReport, EstimateError>
    where
        F: SampleableField<D> + ?Sized,
    {
        estimate::estimate_radii_with_seed(points, field, &self.config, seed)
    }

    /// Parallel [`estimate_with_seed`](Self::estimate_with_seed).
    #[cfg(feature = "parallel")]
    pub fn estimate_par<const D: usize, F>(
        &self,
        points: &mut [TubePoint<D>],
        field: &F,
        seed: RadiusSeed,
    ) -> Result<RadiusReport, EstimateError>
    where
        F: SampleableField<D> + Sync + ?Sized,
    {
        estimate::estimate_radii_par(points, field, &self.config, seed)
    }

    /// Final response a point must reach to be accepted.
    pub fn thresh_medialness(&self) -> f64 {
        self.config.thresh_medialness
    }

    /// Set the acceptance threshold. Must be finite.
    pub fn set_thresh_medialness(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.thresh_medialness = config::finite("thresh_medialness", value)?;
        Ok(())
    }

    /// Coarse response below which refinement is skipped.
    pub fn thresh_medialness_start(&self) -> f64 {
        self.config.thresh_medialness_start
    }

    /// Set the coarse-pass gate. Must be finite.
    pub fn set_thresh_medialness_start(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.thresh_medialness_start = config::finite("thresh_medialness_start", value)?;
        Ok(())
    }

    /// Whether the signed ridge response is used.
    pub fn extract_ridge(&self) -> bool {
        self.config.extract_ridge
    }

    /// Ridge (`true`) or edge (`false`) response.
    pub fn set_extract_ridge(&mut self, value: bool) {
        self.config.extract_ridge = value;
    }

    /// Initial radius guess.
    pub fn radius0(&self) -> f64 {
        self.config.radius0
    }

    /// Initial guess. Values outside the admissible range are accepted and
    /// clamped per point.
    pub fn set_radius0(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.radius0 = config::non_negative("radius0", value)?;
        Ok(())
    }

    /// Smallest admissible radius.
    pub fn min_radius(&self) -> f64 {
        self.config.min_radius
    }

    /// Must not exceed the current [`max_radius`](Self::max_radius).
    pub fn set_min_radius(&mut self, value: f64) -> Result<(), ConfigError> {
        config::radius_range(value, self.config.max_radius)?;
        self.config.min_radius = value;
        Ok(())
    }

    /// Largest admissible radius.
    pub fn max_radius(&self) -> f64 {
        self.config.max_radius
    }

    /// Must not be below the current [`min_radius`](Self::min_radius).
    pub fn set_max_radius(&mut self, value: f64) -> Result<(), ConfigError> {
        config::radius_range(self.config.min_radius, value)?;
        self.config.max_radius = value;
        Ok(())
    }

    /// Set both bounds at once, for moves that would transiently invert the
    /// range when done one bound at a time.
    pub fn set_radius_range(&mut self, min_radius: f64, max_radius: f64) -> Result<(), ConfigError> {
        config::radius_range(min_radius, max_radius)?;
        self.config.min_radius = min_radius;
        self.config.max_radius = max_radius;
        Ok(())
    }

    /// Half-width of the coarse window around the initial guess.
    pub fn search_halfwidth(&self) -> f64 {
        self.config.search_halfwidth
    }

    /// Set the coarse window half-width. Must be positive.
    pub fn set_search_halfwidth(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.search_halfwidth = config::positive("search_halfwidth", value)?;
        Ok(())
    }

    /// Spacing of the coarse radius grid.
    pub fn radius_step(&self) -> f64 {
        self.config.radius_step
    }

    /// Set the coarse grid spacing. Must be positive.
    pub fn set_radius_step(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.radius_step = config::positive("radius_step", value)?;
        Ok(())
    }

    /// Half-width of the boundary central difference.
    pub fn kernel_halfwidth(&self) -> f64 {
        self.config.kernel_halfwidth
    }

    /// Set the boundary kernel half-width. Must be positive.
    pub fn set_kernel_halfwidth(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.kernel_halfwidth = config::positive("kernel_halfwidth", value)?;
        Ok(())
    }

    /// Rays on the normal circle.
    pub fn n_directions(&self) -> usize {
        self.config.n_directions
    }

    /// Set the ray count. At least [`MIN_DIRECTIONS`](crate::MIN_DIRECTIONS).
    pub fn set_n_directions(&mut self, value: usize) -> Result<(), ConfigError> {
        self.config.n_directions = config::directions(value)?;
        Ok(())
    }

    /// Bracket width at which refinement stops.
    pub fn radius_tolerance(&self) -> f64 {
        self.config.radius_tolerance
    }

    /// Set the refinement tolerance. Must be positive.
    pub fn set_radius_tolerance(&mut self, value: f64) -> Result<(), ConfigError> {
        self.config.radius_tolerance = config::positive("radius_tolerance", value)?;
        Ok(())
    }

    /// Golden-section iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    /// Set the iteration cap. Must be at least 1.
    pub fn set_max_iterations(&mut self, value: usize) -> Result<(), ConfigError> {
        self.config.max_iterations = config::iterations(value)?;
        Ok(())
    }

    /// Combination of per-ray responses.
    pub fn aggregator(&self) -> AngularAggregator {
        self.config.aggregator
    }

    /// Set the angular aggregator. Trim fractions must lie in `[0, 0.5)`.
    pub fn set_aggregator(&mut self, value: AngularAggregator) -> Result<(), ConfigError> {
        self.config.aggregator = config::aggregator(value)?;
        Ok(())
    }

    /// Whether reports keep the coarse response profile.
    pub fn store_response(&self) -> bool {
        self.config.store_response
    }

    /// Keep or drop the coarse response profile in reports.
    pub fn set_store_response(&mut self, value: bool) {
        self.config.store_response = value;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::test_utils::{bright_cylinder_z, on_axis_point};

    #[test]
    fn thresholds_and_ridge_flag_round_trip() {
        let mut e = RadiusEstimator::new();
        e.set_thresh_medialness(0.005).unwrap();
        e.set_thresh_medialness_start(0.002).unwrap();
        e.set_extract_ridge(true);
        assert_eq!(e.thresh_medialness().to_bits(), 0.005f64.to_bits());
        assert_eq!(e.thresh_medialness_start().to_bits(), 0.002f64.to_bits());
        assert!(e.extract_ridge());
        e.set_extract_ridge(false);
        assert!(!e.extract_ridge());
    }

    #[test]
    fn every_numeric_setter_round_trips_bit_exact() {
        let mut e = RadiusEstimator::new();
        let v = 0.1 + 0.2;
        e.set_radius0(v).unwrap();
        e.set_search_halfwidth(v).unwrap();
        e.set_radius_step(v).unwrap();
        e.set_kernel_halfwidth(v).unwrap();
        e.set_radius_tolerance(v).unwrap();
        e.set_radius_range(v, 7.0 * v).unwrap();
        e.set_n_directions(9).unwrap();
        e.set_max_iterations(3).unwrap();
        e.set_store_response(true);
        let agg = AngularAggregator::TrimmedMean { trim_fraction: 0.25 };
        e.set_aggregator(agg).unwrap();

        for got in [
            e.radius0(),
            e.search_halfwidth(),
            e.radius_step(),
            e.kernel_halfwidth(),
            e.radius_tolerance(),
            e.min_radius(),
        ] {
            assert_eq!(got.to_bits(), v.to_bits());
        }
        assert_eq!(e.max_radius().to_bits(), (7.0 * v).to_bits());
        assert_eq!(e.n_directions(), 9);
        assert_eq!(e.max_iterations(), 3);
        assert!(e.store_response());
        assert_eq!(e.aggregator(), agg);
        e.config().validate().unwrap();
    }

    #[test]
    fn rejected_values_leave_config_untouched() {
        let mut e = RadiusEstimator::new();
        let before = e.clone();
        assert!(e.set_thresh_medialness(f64::NAN).is_err());
        assert!(e.set_radius0(-1.0).is_err());
        assert!(e.set_radius_step(0.0).is_err());
        assert!(e.set_kernel_halfwidth(f64::INFINITY).is_err());
        assert!(e.set_n_directions(3).is_err());
        assert!(e.set_max_iterations(0).is_err());
        assert_eq!(
            e.set_min_radius(25.0),
            Err(ConfigError::RadiusRangeInverted {
                min_radius: 25.0,
                max_radius: 20.0
            })
        );
        assert!(e.set_max_radius(0.1).is_err());
        assert!(e
            .set_aggregator(AngularAggregator::TrimmedMean { trim_fraction: -0.1 })
            .is_err());
        assert_eq!(e, before);
    }

    #[test]
    fn with_config_validates() {
        let bad = EstimatorConfig {
            radius_tolerance: 0.0,
            ..Default::default()
        };
        assert!(RadiusEstimator::with_config(bad).is_err());
        let good = EstimatorConfig {
            radius0: 3.0,
            ..Default::default()
        };
        let e = RadiusEstimator::with_config(good.clone()).unwrap();
        assert_eq!(e.config(), &good);
    }

    #[test]
    fn estimate_uses_held_config() {
        let field = bright_cylinder_z(5.0, 1.0);
        let mut e = RadiusEstimator::new();
        e.set_radius0(3.0).unwrap();
        let mut pts = vec![on_axis_point(Vector3::zeros())];
        let report = e.estimate(&mut pts, &field).unwrap();
        assert_eq!(report.points[0].seed_radius, 3.0);
        assert!((pts[0].radius - 5.0).abs() < 0.05);

        let report = e
            .estimate_with_seed(&mut pts, &field, RadiusSeed::Fixed(9.0))
            .unwrap();
        assert_eq!(report.points[0].seed_radius, 9.0);
        assert!((pts[0].radius - 5.0).abs() < 0.05);
    }
}
