//! Stylize filters: crystallize, pixellate and edge detection.

use super::{map_pixels, to_u8};
use crate::core::params::{NativeParameters, ParameterKind};
use crate::filters::engine::{FilterFailure, FilterOutput, ImageFilter};
use crate::filters::registry::FilterRegistry;
use crate::filters::variant::FilterVariant;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Register stylize filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(Crystallize);
    registry.register(Edges);
    registry.register(Pixellate);
}

/// Cheap integer hash mapped to `[0, 1)`, used to jitter Voronoi seeds.
fn hash_unit(x: u32, y: u32, salt: u32) -> f32 {
    let mut h = x.wrapping_mul(0x8da6_b343) ^ y.wrapping_mul(0xd816_3841) ^ salt.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    (h & 0x00ff_ffff) as f32 / 16_777_216.0
}

/// Fills Voronoi cells with their average colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crystallize;

impl Crystallize {
    /// Cell size used when none is supplied.
    pub const DEFAULT_RADIUS: f64 = 20.0;
}

impl ImageFilter for Crystallize {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Crystallize
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
        let src = image.to_rgba8();
        if radius < 1.0 {
            return Ok(FilterOutput::full(DynamicImage::ImageRgba8(src)));
        }
        Ok(FilterOutput::full(DynamicImage::ImageRgba8(crystallize(&src, radius as f32))))
    }
}

fn crystallize(src: &RgbaImage, cell: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return src.clone();
    }

    let cells_x = ((w as f32 / cell).ceil() as i64).max(1);
    let cells_y = ((h as f32 / cell).ceil() as i64).max(1);

    // One jittered seed per grid cell.
    let mut seeds = Vec::with_capacity((cells_x * cells_y) as usize);
    for cy in 0..cells_y {
        for cx in 0..cells_x {
            let jx = hash_unit(cx as u32, cy as u32, 1);
            let jy = hash_unit(cx as u32, cy as u32, 2);
            seeds.push(((cx as f32 + jx) * cell, (cy as f32 + jy) * cell));
        }
    }

    let nearest = |x: u32, y: u32| -> usize {
        let gx = (x as f32 / cell) as i64;
        let gy = (y as f32 / cell) as i64;
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);

        let mut best = (f32::MAX, 0usize);
        for ny in (gy - 1).max(0)..=(gy + 1).min(cells_y - 1) {
            for nx in (gx - 1).max(0)..=(gx + 1).min(cells_x - 1) {
                let idx = (ny * cells_x + nx) as usize;
                let (sx, sy) = seeds[idx];
                let d = (px - sx).powi(2) + (py - sy).powi(2);
                if d < best.0 {
                    best = (d, idx);
                }
            }
        }
        best.1
    };

    let mut owner = vec![0usize; (w * h) as usize];
    let mut sums = vec![[0u64; 4]; seeds.len()];
    let mut counts = vec![0u64; seeds.len()];
    for (x, y, p) in src.enumerate_pixels() {
        let idx = nearest(x, y);
        owner[(y * w + x) as usize] = idx;
        for c in 0..4 {
            sums[idx][c] += p[c] as u64;
        }
        counts[idx] += 1;
    }

    let averages: Vec<Rgba<u8>> = sums
        .iter()
        .zip(&counts)
        .map(|(sum, &n)| {
            let n = n.max(1);
            Rgba([
                ((sum[0] + n / 2) / n) as u8,
                ((sum[1] + n / 2) / n) as u8,
                ((sum[2] + n / 2) / n) as u8,
                ((sum[3] + n / 2) / n) as u8,
            ])
        })
        .collect();

    map_pixels(src, |x, y, _| averages[owner[(y * w + x) as usize]])
}

/// Replaces square blocks with their centre sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pixellate;

impl Pixellate {
    /// Block size used when none is supplied.
    pub const DEFAULT_SCALE: f64 = 8.0;
}

impl ImageFilter for Pixellate {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Pixellate
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Scale]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let scale = params.scale_or(Self::DEFAULT_SCALE);
        if !scale.is_finite() {
            return Err(FilterFailure(format!("scale must be finite, got {}", scale)));
        }
        let block = (scale.round() as u32).max(1);

        let src = image.to_rgba8();
        let (w, h) = src.dimensions();
        let out = map_pixels(&src, |x, y, _| {
            let sx = ((x / block) * block + block / 2).min(w - 1);
            let sy = ((y / block) * block + block / 2).min(h - 1);
            *src.get_pixel(sx, sy)
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

/// Sobel edge detection per colour channel.
///
/// The gradient magnitude is scaled by `intensity / 4`. The Sobel weights on
/// each side of the centre sum to 4, so at intensity 1 a step of height `h`
/// renders as `h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edges;

impl Edges {
    /// Edge gain used when none is supplied.
    pub const DEFAULT_INTENSITY: f64 = 1.0;
}

impl ImageFilter for Edges {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Edges
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Intensity]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let gain = (params.intensity_or(Self::DEFAULT_INTENSITY).max(0.0) / 4.0) as f32;
        let src = image.to_rgba8();
        let (w, h) = src.dimensions();

        let gradients: Vec<_> = (0..3)
            .map(|c| {
                let channel = GrayImage::from_fn(w, h, |x, y| Luma([src.get_pixel(x, y)[c]]));
                imageproc::gradients::sobel_gradients(&channel)
            })
            .collect();

        let out = map_pixels(&src, |x, y, p| {
            let edge = |c: usize| to_u8(gradients[c].get_pixel(x, y)[0] as f32 * gain);
            Rgba([edge(0), edge(1), edge(2), p[3]])
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::test_support::sample_image;

    #[test]
    fn test_pixellate_blocks_are_uniform() {
        let img = sample_image(32, 32);
        let params = NativeParameters {
            scale: Some(7.0),
            ..Default::default()
        };
        let out = Pixellate.render(&img, &params).unwrap().image.to_rgba8();
        for y in 0..7 {
            for x in 0..7 {
                assert_eq!(out.get_pixel(x, y), out.get_pixel(0, 0));
            }
        }
        assert_eq!(out.get_pixel(0, 0), img.to_rgba8().get_pixel(3, 3));
    }

    #[test]
    fn test_pixellate_zero_scale_is_identity() {
        let img = sample_image(9, 9);
        let params = NativeParameters {
            scale: Some(0.0),
            ..Default::default()
        };
        let out = Pixellate.render(&img, &params).unwrap();
        assert_eq!(out.image.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_pixellate_rejects_nan() {
        let params = NativeParameters {
            scale: Some(f64::NAN),
            ..Default::default()
        };
        assert!(Pixellate.render(&sample_image(4, 4), &params).is_err());
    }

    #[test]
    fn test_crystallize_flat_image_unchanged() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 20, Rgba([90, 120, 150, 255])));
        let params = NativeParameters {
            radius: Some(6.0),
            ..Default::default()
        };
        let out = Crystallize.render(&img, &params).unwrap();
        assert_eq!(out.image.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_crystallize_reduces_distinct_colors() {
        let img = sample_image(40, 40);
        let params = NativeParameters {
            radius: Some(10.0),
            ..Default::default()
        };
        let out = Crystallize.render(&img, &params).unwrap().image.to_rgba8();
        let distinct: std::collections::HashSet<_> = out.pixels().map(|p| p.0).collect();
        assert!(distinct.len() <= 16 * 2);
    }

    #[test]
    fn test_edges_flat_image_is_black() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([80, 80, 80, 255])));
        let params = NativeParameters {
            intensity: Some(3.0),
            ..Default::default()
        };
        let out = Edges.render(&img, &params).unwrap().image.to_rgba8();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_edges_gain_is_normalized() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 8, |x, _| {
            let v = if x < 4 { 0 } else { 100 };
            Rgba([v, v, v, 200])
        }));
        let at = |intensity: f64| {
            let params = NativeParameters {
                intensity: Some(intensity),
                ..Default::default()
            };
            Edges.render(&img, &params).unwrap().image.to_rgba8()
        };

        let unit = at(1.0);
        assert_eq!(unit.get_pixel(4, 4), &Rgba([100, 100, 100, 200]));
        assert_eq!(unit.get_pixel(1, 4), &Rgba([0, 0, 0, 200]));
        assert_eq!(at(2.0).get_pixel(3, 4)[0], 200);
    }

    #[test]
    fn test_hash_unit_range() {
        for i in 0..100 {
            let v = hash_unit(i, i * 7, 3);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
