//! Centerline point type shared by the frame builder and the radius estimator.

use nalgebra::SVector;

/// One sample along a tube centerline.
///
/// `position` is supplied by the caller. `tangent`, `normal1` and `normal2`
/// are filled by [`compute_tangents_and_normals`](crate::compute_tangents_and_normals),
/// `radius` and `medialness` by the radius estimator.
///
/// In 2-D the cross-section is a line and `normal2` stays the zero vector.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TubePoint<const D: usize> {
    /// Position in physical (field) coordinates.
    pub position: SVector<f64, D>,
    /// Unit tangent along the centerline.
    pub tangent: SVector<f64, D>,
    /// First unit normal spanning the cross-sectional plane.
    pub normal1: SVector<f64, D>,
    /// Second unit normal spanning the cross-sectional plane (zero in 2-D).
    pub normal2: SVector<f64, D>,
    /// Estimated radius in physical units. Never negative.
    pub radius: f64,
    /// Medialness response at `radius` (diagnostic).
    pub medialness: f64,
}

/// Ordered centerline of one tube, in arc-length order.
pub type Centerline<const D: usize> = Vec<TubePoint<D>>;

impl<const D: usize> TubePoint<D> {
    /// Create a point with only its position set.
    pub fn new(position: SVector<f64, D>) -> Self {
        Self {
            position,
            tangent: SVector::zeros(),
            normal1: SVector::zeros(),
            normal2: SVector::zeros(),
            radius: 0.0,
            medialness: 0.0,
        }
    }

    /// Create a point with position and a prior radius.
    pub fn with_radius(position: SVector<f64, D>, radius: f64) -> Self {
        Self {
            radius,
            ..Self::new(position)
        }
    }

    /// Whether the cross-section has a second normal direction.
    #[inline]
    pub fn has_normal2() -> bool {
        D >= 3
    }
}

/// Build a centerline from bare positions.
pub fn centerline_from_positions<const D: usize, I>(positions: I) -> Centerline<D>
where
    I: IntoIterator<Item = SVector<f64, D>>,
{
    positions.into_iter().map(TubePoint::new).collect()
}
