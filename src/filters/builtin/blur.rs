//! Blur filters: Gaussian blur and bloom.

use super::{map_pixels, to_u8};
use crate::core::params::{NativeParameters, ParameterKind};
use crate::filters::engine::{FilterFailure, FilterOutput, ImageFilter};
use crate::filters::registry::FilterRegistry;
use crate::filters::variant::FilterVariant;
use image::{DynamicImage, Rgba, Rgba32FImage, RgbaImage};
use rayon::prelude::*;

/// Register blur filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(GaussianBlur);
    registry.register(Bloom);
}

/// Sigma below which blurring is a no-op.
const MIN_SIGMA: f32 = 0.01;

/// Normalized 1-D Gaussian weights reaching three standard deviations out.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (sigma * 3.0).ceil() as i64;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Blur with a Gaussian whose radius covers three standard deviations.
///
/// Both passes run in floating point and the result is left unrounded, so
/// callers quantize once. The output keeps the input's bounds; edges are
/// clamped rather than spreading into an infinite extent.
pub(crate) fn blur_rgba(src: &RgbaImage, radius: f64) -> Rgba32FImage {
    let (w, h) = src.dimensions();
    let mut out = Rgba32FImage::from_fn(w, h, |x, y| Rgba(src.get_pixel(x, y).0.map(f32::from)));

    let sigma = (radius / 3.0) as f32;
    if !sigma.is_finite() || sigma < MIN_SIGMA || w == 0 || h == 0 {
        return out;
    }

    let kernel = gaussian_kernel(sigma);
    let half = (kernel.len() / 2) as i64;
    let (w, h) = (w as usize, h as usize);
    let stride = w * 4;

    let mut horizontal = vec![0.0f32; stride * h];
    let input: &[f32] = &out;
    horizontal.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let src_row = &input[y * stride..(y + 1) * stride];
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as i64 + k as i64 - half).clamp(0, w as i64 - 1) as usize;
                for (a, v) in acc.iter_mut().zip(&src_row[sx * 4..sx * 4 + 4]) {
                    *a += weight * v;
                }
            }
            row[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    out.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as i64 + k as i64 - half).clamp(0, h as i64 - 1) as usize;
                let si = sy * stride + x * 4;
                for (a, v) in acc.iter_mut().zip(&horizontal[si..si + 4]) {
                    *a += weight * v;
                }
            }
            row[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    out
}

/// Round a float image back to bytes.
fn quantize(src: &Rgba32FImage) -> RgbaImage {
    RgbaImage::from_fn(src.width(), src.height(), |x, y| Rgba(src.get_pixel(x, y).0.map(to_u8)))
}

/// Applies Gaussian blur.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlur;

impl GaussianBlur {
    /// Radius used when none is supplied.
    pub const DEFAULT_RADIUS: f64 = 10.0;
}

impl ImageFilter for GaussianBlur {
    fn variant(&self) -> FilterVariant {
        FilterVariant::GaussianBlur
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Radius]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let radius = params.radius_or(Self::DEFAULT_RADIUS);
        let blurred = quantize(&blur_rgba(&image.to_rgba8(), radius));
        Ok(FilterOutput::full(DynamicImage::ImageRgba8(blurred)))
    }
}

/// Adds a blurred copy on top of the image so bright areas glow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bloom;

impl Bloom {
    /// Radius used when none is supplied.
    pub const DEFAULT_RADIUS: f64 = 10.0;
    /// Glow strength used when none is supplied.
    pub const DEFAULT_INTENSITY: f64 = 0.5;
}

impl ImageFilter for Bloom {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Bloom
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Intensity, ParameterKind::Radius]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let radius = params.radius_or(Self::DEFAULT_RADIUS);
        // Glow strength saturates at 1.
        let amount = params.intensity_or(Self::DEFAULT_INTENSITY).clamp(0.0, 1.0) as f32;

        let src = image.to_rgba8();
        let glow = blur_rgba(&src, radius);

        let out = map_pixels(&src, |x, y, p| {
            let g = glow.get_pixel(x, y);
            let add = |c: usize| to_u8(p[c] as f32 + amount * g[c]);
            Rgba([add(0), add(1), add(2), p[3]])
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}
