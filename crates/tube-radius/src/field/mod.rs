//! Scalar fields sampled by the radius estimator.
//!
//! The estimator never indexes images directly. It queries a
//! [`SampleableField`] at continuous physical positions along rays in the
//! normal plane of each centerline point.

mod raster;
mod volume;

use nalgebra::SVector;

pub use raster::{bilinear_sample_f32_checked, bilinear_sample_u8_checked};
pub use volume::{Volume, VolumeError};

/// Read-only scalar field over continuous physical coordinates.
///
/// `sample` returns `None` when `position` lies outside the region where the
/// field can be interpolated. This is distinct from a valid sample of value
/// zero: the estimator counts out-of-bounds rays separately and lets them
/// contribute no response.
///
/// Built-in implementations: `image::GrayImage` and
/// `image::ImageBuffer<Luma<f32>, Vec<f32>>` (2-D, pixel-center
/// coordinates), [`Volume`] (3-D voxel grid with origin and spacing) and
/// [`FnField`] (analytic closure).
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use tube_radius::SampleableField;
///
/// struct Ball;
///
/// impl SampleableField<3> for Ball {
///     fn sample(&self, p: &Vector3<f64>) -> Option<f64> {
///         Some(if p.norm() < 4.0 { 1.0 } else { 0.0 })
///     }
/// }
///
/// assert_eq!(Ball.sample(&Vector3::zeros()), Some(1.0));
/// ```
pub trait SampleableField<const D: usize> {
    /// Sample the field at a physical position.
    fn sample(&self, position: &SVector<f64, D>) -> Option<f64>;

    /// Whether the field holds no data at all.
    fn is_empty(&self) -> bool {
        false
    }
}

impl<const D: usize, F: SampleableField<D> + ?Sized> SampleableField<D> for &F {
    #[inline]
    fn sample(&self, position: &SVector<f64, D>) -> Option<f64> {
        (**self).sample(position)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

impl<const D: usize, F: SampleableField<D> + ?Sized> SampleableField<D> for Box<F> {
    #[inline]
    fn sample(&self, position: &SVector<f64, D>) -> Option<f64> {
        (**self).sample(position)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// Field defined by a closure, for analytic phantoms.
#[derive(Clone, Copy)]
pub struct FnField<const D: usize, F> {
    f: F,
}

impl<const D: usize, F> FnField<D, F>
where
    F: Fn(&SVector<f64, D>) -> Option<f64>,
{
    /// Wrap a sampling closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<const D: usize, F> SampleableField<D> for FnField<D, F>
where
    F: Fn(&SVector<f64, D>) -> Option<f64>,
{
    #[inline]
    fn sample(&self, position: &SVector<f64, D>) -> Option<f64> {
        (self.f)(position).filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Vector2, Vector3};

    use super::*;

    #[test]
    fn fn_field_filters_non_finite_values() {
        let f = FnField::new(|p: &Vector2<f64>| Some(if p.x > 0.0 { f64::NAN } else { 0.0 }));
        assert_eq!(f.sample(&Vector2::new(-1.0, 0.0)), Some(0.0));
        assert_eq!(f.sample(&Vector2::new(1.0, 0.0)), None);
    }

    #[test]
    fn references_and_boxes_forward_sampling() {
        let f = FnField::new(|p: &Vector3<f64>| Some(p.z));
        let by_ref: &dyn SampleableField<3> = &f;
        let boxed: Box<dyn SampleableField<3>> = Box::new(f);
        let p = Vector3::new(0.0, 0.0, 2.5);
        assert_eq!(by_ref.sample(&p), Some(2.5));
        assert_eq!(boxed.sample(&p), Some(2.5));
        assert!(!boxed.is_empty());
    }
}
