//! tube-radius: local frames and radius estimation along tubular centerlines.
//!
//! Given an ordered centerline extracted from a 2-D image or 3-D volume, the
//! crate annotates each point with its cross-sectional geometry:
//!
//! 1. **Frames** – unit tangent by finite differences plus an orthonormal
//!    normal frame spanning the cross-sectional plane
//!    ([`compute_tangents_and_normals`]).
//! 2. **Medialness** – response along rays in the normal plane at a candidate
//!    radius ([`medialness_at`]), ridge (bright tube) or edge (either polarity).
//! 3. **Radius** – coarse grid scan around an initial guess, golden-section
//!    refinement, acceptance thresholds ([`estimate_radii`],
//!    [`RadiusEstimator`]).
//!
//! Fields are anything implementing [`SampleableField`]; adapters are provided
//! for `image` buffers (2-D), dense voxel grids ([`Volume`], 3-D) and analytic
//! closures ([`FnField`]).
//!
//! # Public API
//! - [`TubePoint`] and [`Centerline`] as the data model
//! - [`RadiusEstimator`] and [`EstimatorConfig`] for configuration
//! - [`RadiusReport`] with a [`PointStatus`] per point for diagnostics
//!
//! The library logs through `tracing` and never installs a subscriber.

mod field;
mod frame;
mod radius;
mod tube;

#[cfg(test)]
pub(crate) mod test_utils;

pub use field::{
    bilinear_sample_f32_checked, bilinear_sample_u8_checked, FnField, SampleableField, Volume,
    VolumeError,
};
pub use frame::{
    check_frame, compute_tangents_and_normals, orthonormal_complement, FrameError, FrameReport,
    GeometryDefect, TangentRepair, FRAME_TOLERANCE, MIN_FRAME_POINTS,
};
#[cfg(feature = "parallel")]
pub use radius::estimate_radii_par;
pub use radius::{
    estimate_radii, estimate_radii_with_seed, medialness_at, smooth_radii, AngularAggregator,
    ConfigError, EstimateError, EstimatorConfig, LowConfidence, MedialnessSample, PointReport,
    PointStatus, RadiusEstimator, RadiusReport, RadiusSeed, MIN_DIRECTIONS,
};
pub use tube::{centerline_from_positions, Centerline, TubePoint};
