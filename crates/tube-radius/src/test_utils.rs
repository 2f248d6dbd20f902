//! Shared synthetic tubes for unit tests.
//!
//! Every phantom uses the same cross-section profile,
//! `I(rho) = 0.5 * (1 - tanh((rho - R) / w))`, a bright tube of radius `R`
//! with boundary width `w` on a dark background.

use image::{GrayImage, Luma};
use nalgebra::Vector3;

use crate::field::{FnField, Volume};
use crate::tube::TubePoint;

/// Cross-section intensity at distance `rho` from the axis.
pub(crate) fn tube_profile(rho: f64, radius: f64, width: f64) -> f64 {
    0.5 * (1.0 - ((rho - radius) / width).tanh())
}

/// Analytic bright cylinder around the z axis through the origin.
pub(crate) fn bright_cylinder_z(
    radius: f64,
    width: f64,
) -> FnField<3, impl Fn(&Vector3<f64>) -> Option<f64> + Copy> {
    FnField::new(move |p: &Vector3<f64>| {
        Some(tube_profile(p.x.hypot(p.y), radius, width))
    })
}

/// Point on a z-aligned axis with the frame the frame builder produces for a
/// `+z` tangent.
pub(crate) fn on_axis_point(position: Vector3<f64>) -> TubePoint<3> {
    TubePoint {
        tangent: Vector3::z(),
        normal1: Vector3::x(),
        normal2: Vector3::y(),
        ..TubePoint::new(position)
    }
}

/// `n` points at unit spacing along `+z` starting at `start`, frames unset.
pub(crate) fn z_axis_centerline(start: Vector3<f64>, n: usize) -> Vec<TubePoint<3>> {
    (0..n)
        .map(|k| TubePoint::new(start + Vector3::new(0.0, 0.0, k as f64)))
        .collect()
}

/// Unit-spacing voxel cylinder along z, centered in the xy extent.
pub(crate) fn cylinder_volume(radius: f64, dims: [usize; 3], width: f64) -> Volume<f32> {
    let cx = (dims[0] as f64 - 1.0) * 0.5;
    let cy = (dims[1] as f64 - 1.0) * 0.5;
    Volume::from_fn(dims, [0.0; 3], [1.0; 3], |p| {
        tube_profile((p.x - cx).hypot(p.y - cy), radius, width) as f32
    })
    .expect("valid test volume")
}

/// Horizontal bright bar `|y - center_y| <= half_width`, area-sampled per
/// pixel row and Gaussian-blurred.
pub(crate) fn blurred_bar_image(
    w: u32,
    h: u32,
    center_y: f64,
    half_width: f64,
    sigma: f32,
) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        let lo = (y as f64 - 0.5).max(center_y - half_width);
        let hi = (y as f64 + 0.5).min(center_y + half_width);
        let cover = (hi - lo).clamp(0.0, 1.0);
        let pix = (cover * 255.0).round() as u8;
        for x in 0..w {
            img.put_pixel(x, y, Luma([pix]));
        }
    }
    blur_gray(&img, sigma)
}

/// Gaussian-blur a `GrayImage` via `imageproc`.
pub(crate) fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut f = image::ImageBuffer::<Luma<f32>, Vec<f32>>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.put_pixel(x, y, Luma([img.get_pixel(x, y)[0] as f32 / 255.0]));
        }
    }
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
            out.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    out
}
