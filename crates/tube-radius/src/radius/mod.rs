//! Medialness-based radius estimation.

mod config;
mod estimate;
mod estimator;
mod medialness;
mod profile;
mod report;
mod search;
mod smooth;

pub use config::{AngularAggregator, ConfigError, EstimatorConfig, RadiusSeed, MIN_DIRECTIONS};
#[cfg(feature = "parallel")]
pub use estimate::estimate_radii_par;
pub use estimate::{estimate_radii, estimate_radii_with_seed, EstimateError};
pub use estimator::RadiusEstimator;
pub use medialness::{medialness_at, MedialnessSample};
pub use report::{LowConfidence, PointReport, PointStatus, RadiusReport};
pub use smooth::smooth_radii;
