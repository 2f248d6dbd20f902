//! 2-D raster adapters over `image` buffers.
//!
//! Coordinates are pixel centers: `(x, y)` with integer values at pixel
//! centers. A sample is out of bounds when its 2x2 bilinear neighbourhood is
//! not fully inside the image.

use image::{GrayImage, ImageBuffer, Luma};
use nalgebra::Vector2;

use super::SampleableField;

/// Sample a grayscale image at sub-pixel position using bilinear interpolation.
/// Returns intensity in [0, 1] or `None` if sampling is out of bounds.
#[inline]
pub fn bilinear_sample_u8_checked(img: &GrayImage, x: f64, y: f64) -> Option<f64> {
    const INV_255: f64 = 1.0 / 255.0;
    let (w, h) = img.dimensions();
    let (idx00, fx, fy) = bilinear_cell(w, h, x, y)?;
    let stride = w as usize;
    let raw = img.as_raw();
    Some(blend(
        raw[idx00] as f64 * INV_255,
        raw[idx00 + 1] as f64 * INV_255,
        raw[idx00 + stride] as f64 * INV_255,
        raw[idx00 + stride + 1] as f64 * INV_255,
        fx,
        fy,
    ))
}

/// Sample a float image at sub-pixel position using bilinear interpolation.
/// Returns the raw interpolated value or `None` if sampling is out of bounds.
#[inline]
pub fn bilinear_sample_f32_checked(
    img: &ImageBuffer<Luma<f32>, Vec<f32>>,
    x: f64,
    y: f64,
) -> Option<f64> {
    let (w, h) = img.dimensions();
    let (idx00, fx, fy) = bilinear_cell(w, h, x, y)?;
    let stride = w as usize;
    let raw = img.as_raw();
    Some(blend(
        raw[idx00] as f64,
        raw[idx00 + 1] as f64,
        raw[idx00 + stride] as f64,
        raw[idx00 + stride + 1] as f64,
        fx,
        fy,
    ))
}

/// Flat index of the top-left neighbour plus fractional offsets.
#[inline]
fn bilinear_cell(w: u32, h: u32, x: f64, y: f64) -> Option<(usize, f64, f64)> {
    if w < 2 || h < 2 || !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    if x0 >= (w - 1) as f64 || y0 >= (h - 1) as f64 {
        return None;
    }
    let idx00 = y0 as usize * w as usize + x0 as usize;
    Some((idx00, x - x0, y - y0))
}

#[inline]
fn blend(p00: f64, p10: f64, p01: f64, p11: f64, fx: f64, fy: f64) -> f64 {
    (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
}

impl SampleableField<2> for GrayImage {
    #[inline]
    fn sample(&self, position: &Vector2<f64>) -> Option<f64> {
        bilinear_sample_u8_checked(self, position.x, position.y)
    }

    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl SampleableField<2> for ImageBuffer<Luma<f32>, Vec<f32>> {
    #[inline]
    fn sample(&self, position: &Vector2<f64>) -> Option<f64> {
        bilinear_sample_f32_checked(self, position.x, position.y).filter(|v| v.is_finite())
    }

    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
