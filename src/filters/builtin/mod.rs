//! Built-in filter implementations.
//!
//! This module contains the CPU filters backing the ten catalog variants.

mod blur;
mod color;
mod sharpen;
mod stylize;

use crate::filters::registry::FilterRegistry;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Register all built-in filters.
pub fn register_all(registry: &mut FilterRegistry) {
    stylize::register(registry);
    blur::register(registry);
    color::register(registry);
    sharpen::register(registry);
}

// Re-export for direct access
pub use blur::{Bloom, GaussianBlur};
pub use color::{SepiaTone, Thermal, Vignette, XRay};
pub use sharpen::UnsharpMask;
pub use stylize::{Crystallize, Edges, Pixellate};

/// Apply `transform` to every pixel, rows in parallel.
///
/// The closure receives `(x, y, pixel)` and returns the new pixel.
pub(crate) fn map_pixels<F>(src: &RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(u32, u32, Rgba<u8>) -> Rgba<u8> + Sync,
{
    let (w, h) = src.dimensions();
    let stride = w as usize * 4;
    let mut dst = RgbaImage::new(w, h);
    if stride == 0 {
        return dst;
    }

    let src_raw = src.as_raw();
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for x in 0..w as usize {
            let si = y * stride + x * 4;
            let px = Rgba([src_raw[si], src_raw[si + 1], src_raw[si + 2], src_raw[si + 3]]);
            let out = transform(x as u32, y as u32, px);
            row[x * 4..x * 4 + 4].copy_from_slice(&out.0);
        }
    });

    dst
}

/// Rec. 601 luma in `[0, 255]`.
pub(crate) fn luma(px: Rgba<u8>) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Round and clamp a channel value into a byte.
pub(crate) fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
