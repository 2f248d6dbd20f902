//! Radius estimator configuration.

use std::path::Path;

/// Aggregation of per-ray responses at one candidate radius.
///
/// Out-of-bounds rays enter the aggregation as zero responses, so they always
/// pull the combined value down.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngularAggregator {
    /// Arithmetic mean over all rays.
    Mean,
    /// Median across rays.
    Median,
    /// Trimmed mean (drops `trim_fraction` on each side).
    TrimmedMean {
        /// Fraction removed from each tail before averaging.
        trim_fraction: f64,
    },
}

/// Where the per-point initial radius comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusSeed {
    /// Use [`EstimatorConfig::radius0`] for every point.
    #[default]
    Configured,
    /// Use one caller-supplied value for every point.
    Fixed(f64),
    /// Use each point's stored radius; falls back to `radius0` when the
    /// stored value is not positive and finite.
    PerPoint,
}

/// Configuration errors, reported where a value is set or validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is NaN or infinite.
    NonFinite {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Value must be zero or positive.
    Negative {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Value must be strictly positive.
    NotPositive {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// `max_radius < min_radius`.
    RadiusRangeInverted {
        /// Lower bound.
        min_radius: f64,
        /// Upper bound.
        max_radius: f64,
    },
    /// Not enough rays to cover the normal circle.
    TooFewDirections {
        /// Required minimum.
        needed: usize,
        /// Provided value.
        got: usize,
    },
    /// Refinement needs at least one iteration.
    ZeroIterations,
    /// Trim fraction outside `[0, 0.5)`.
    InvalidTrimFraction(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field, value } => write!(f, "{} must be finite, got {}", field, value),
            Self::Negative { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            Self::RadiusRangeInverted {
                min_radius,
                max_radius,
            } => write!(
                f,
                "max_radius ({}) is smaller than min_radius ({})",
                max_radius, min_radius
            ),
            Self::TooFewDirections { needed, got } => {
                write!(f, "too few ray directions: need {}, got {}", needed, got)
            }
            Self::ZeroIterations => write!(f, "max_iterations must be at least 1"),
            Self::InvalidTrimFraction(t) => {
                write!(f, "trim fraction must be in [0, 0.5), got {}", t)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Minimum number of rays on the normal circle (3-D and above).
pub const MIN_DIRECTIONS: usize = 4;

/// Medialness search and acceptance parameters.
///
/// Lengths are in the physical units of the sampled field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Final response a point must reach to be accepted.
    pub thresh_medialness: f64,
    /// Coarse-pass response below which refinement is skipped.
    pub thresh_medialness_start: f64,
    /// Signed ridge response (bright tube) when `true`, unsigned edge
    /// response when `false`.
    pub extract_ridge: bool,
    /// Initial radius guess.
    pub radius0: f64,
    /// Smallest admissible radius.
    pub min_radius: f64,
    /// Largest admissible radius.
    pub max_radius: f64,
    /// Half-width of the coarse window around the initial guess.
    pub search_halfwidth: f64,
    /// Spacing of the coarse radius grid.
    pub radius_step: f64,
    /// Half-width of the central difference across the candidate boundary.
    pub kernel_halfwidth: f64,
    /// Number of rays on the normal circle (2-D always uses two).
    pub n_directions: usize,
    /// Golden-section search stops once the bracket is narrower than this.
    pub radius_tolerance: f64,
    /// Golden-section iteration cap.
    pub max_iterations: usize,
    /// Combination of per-ray responses.
    pub aggregator: AngularAggregator,
    /// Keep the coarse response profile in each point report.
    pub store_response: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            thresh_medialness: 0.04,
            thresh_medialness_start: 0.01,
            extract_ridge: true,
            radius0: 1.0,
            min_radius: 0.5,
            max_radius: 20.0,
            search_halfwidth: 8.0,
            radius_step: 0.25,
            kernel_halfwidth: 0.5,
            n_directions: 16,
            radius_tolerance: 0.01,
            max_iterations: 64,
            aggregator: AngularAggregator::Mean,
            store_response: false,
        }
    }
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(value)
}

pub(crate) fn radius_range(min_radius: f64, max_radius: f64) -> Result<(), ConfigError> {
    non_negative("min_radius", min_radius)?;
    positive("max_radius", max_radius)?;
    if max_radius < min_radius {
        return Err(ConfigError::RadiusRangeInverted {
            min_radius,
            max_radius,
        });
    }
    Ok(())
}

pub(crate) fn directions(n: usize) -> Result<usize, ConfigError> {
    if n < MIN_DIRECTIONS {
        return Err(ConfigError::TooFewDirections {
            needed: MIN_DIRECTIONS,
            got: n,
        });
    }
    Ok(n)
}

pub(crate) fn iterations(n: usize) -> Result<usize, ConfigError> {
    if n == 0 {
        return Err(ConfigError::ZeroIterations);
    }
    Ok(n)
}

pub(crate) fn aggregator(agg: AngularAggregator) -> Result<AngularAggregator, ConfigError> {
    if let AngularAggregator::TrimmedMean { trim_fraction } = agg {
        if !(0.0..0.5).contains(&trim_fraction) {
            return Err(ConfigError::InvalidTrimFraction(trim_fraction));
        }
    }
    Ok(agg)
}

impl EstimatorConfig {
    /// Check every field and every cross-field relationship.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("thresh_medialness", self.thresh_medialness)?;
        finite("thresh_medialness_start", self.thresh_medialness_start)?;
        non_negative("radius0", self.radius0)?;
        radius_range(self.min_radius, self.max_radius)?;
        positive("search_halfwidth", self.search_halfwidth)?;
        positive("radius_step", self.radius_step)?;
        positive("kernel_halfwidth", self.kernel_halfwidth)?;
        directions(self.n_directions)?;
        positive("radius_tolerance", self.radius_tolerance)?;
        iterations(self.max_iterations)?;
        aggregator(self.aggregator)?;
        Ok(())
    }

    /// Clamp a radius into `[min_radius, max_radius]`.
    #[inline]
    pub fn clamp_radius(&self, r: f64) -> f64 {
        r.clamp(self.min_radius, self.max_radius)
    }

    /// Resolve the initial radius for one point, clamped to the admissible range.
    pub fn seed_radius(&self, seed: RadiusSeed, stored: f64) -> f64 {
        let r = match seed {
            RadiusSeed::Configured => self.radius0,
            RadiusSeed::Fixed(r) if r.is_finite() => r,
            RadiusSeed::Fixed(_) => self.radius0,
            RadiusSeed::PerPoint if stored.is_finite() && stored > 0.0 => stored,
            RadiusSeed::PerPoint => self.radius0,
        };
        self.clamp_radius(r)
    }

    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}
