//! Colour filters: sepia, x-ray, thermal and vignette.

use super::{luma, map_pixels, to_u8};
use crate::core::params::{NativeParameters, ParameterKind};
use crate::filters::engine::{FilterFailure, FilterOutput, ImageFilter};
use crate::filters::registry::FilterRegistry;
use crate::filters::variant::FilterVariant;
use image::{DynamicImage, Rgba};

/// Register colour filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(SepiaTone);
    registry.register(Vignette);
    registry.register(XRay);
    registry.register(Thermal);
}

/// Blends the image towards a sepia tone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SepiaTone;

impl SepiaTone {
    /// Full sepia.
    pub const DEFAULT_INTENSITY: f64 = 1.0;
}

impl ImageFilter for SepiaTone {
    fn variant(&self) -> FilterVariant {
        FilterVariant::SepiaTone
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Intensity]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        // Intensity is a blend factor; anything above 1 is full sepia.
        let amount = params.intensity_or(Self::DEFAULT_INTENSITY).clamp(0.0, 1.0) as f32;

        let out = map_pixels(&image.to_rgba8(), |_, _, p| {
            let (r, g, b) = (p[0] as f32, p[1] as f32, p[2] as f32);
            let sr = 0.393 * r + 0.769 * g + 0.189 * b;
            let sg = 0.349 * r + 0.686 * g + 0.168 * b;
            let sb = 0.272 * r + 0.534 * g + 0.131 * b;
            let mix = |orig: f32, tone: f32| to_u8(orig + (tone.min(255.0) - orig) * amount);
            Rgba([mix(r, sr), mix(g, sg), mix(b, sb), p[3]])
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

/// Darkens the image towards its corners.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vignette;

impl Vignette {
    /// No darkening.
    pub const DEFAULT_INTENSITY: f64 = 0.0;
    /// Falloff radius used when none is supplied.
    pub const DEFAULT_RADIUS: f64 = 1.0;
}

impl ImageFilter for Vignette {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Vignette
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Intensity, ParameterKind::Radius]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        // Native intensity 10 turns the corners black.
        let strength = (params.intensity_or(Self::DEFAULT_INTENSITY) / 10.0).clamp(0.0, 1.0) as f32;
        // Radius 50 spreads the falloff over the whole half-diagonal.
        let softness = (params.radius_or(Self::DEFAULT_RADIUS) / 50.0).clamp(0.01, 1.0) as f32;

        let src = image.to_rgba8();
        let cx = src.width() as f32 / 2.0;
        let cy = src.height() as f32 / 2.0;
        let max_dist = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);

        let out = map_pixels(&src, |x, y, p| {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            let factor = (1.0 - strength * (dist / softness).min(1.0).powi(2)).clamp(0.0, 1.0);
            Rgba([
                to_u8(p[0] as f32 * factor),
                to_u8(p[1] as f32 * factor),
                to_u8(p[2] as f32 * factor),
                p[3],
            ])
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

/// Inverted luminance with a cold blue cast.
#[derive(Debug, Clone, Copy, Default)]
pub struct XRay;

impl ImageFilter for XRay {
    fn variant(&self) -> FilterVariant {
        FilterVariant::XRay
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[]
    }

    fn render(
        &self,
        image: &DynamicImage,
        _params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let out = map_pixels(&image.to_rgba8(), |_, _, p| {
            let l = 255.0 - luma(p);
            Rgba([to_u8(l * 0.82), to_u8(l * 0.93), to_u8(l), p[3]])
        });
        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

/// Gradient stops for the thermal palette, from cold to hot.
const THERMAL_STOPS: [[f32; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 180.0],
    [190.0, 0.0, 170.0],
    [255.0, 120.0, 0.0],
    [255.0, 230.0, 0.0],
    [255.0, 255.0, 255.0],
];

fn thermal_color(l: f32) -> [f32; 3] {
    let t = (l / 255.0).clamp(0.0, 1.0) * (THERMAL_STOPS.len() - 1) as f32;
    let i = (t.floor() as usize).min(THERMAL_STOPS.len() - 2);
    let f = t - i as f32;
    let (a, b) = (THERMAL_STOPS[i], THERMAL_STOPS[i + 1]);
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
    ]
}

/// Maps luminance through a heat-camera palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thermal;

impl ImageFilter for Thermal {
    fn variant(&self) -> FilterVariant {
        FilterVariant::Thermal
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[]
    }

    fn render(
        &self,
        image: &DynamicImage,
        _params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let out = map_pixels(&image.to_rgba8(), |_, _, p| {
            let [r, g, b] = thermal_color(luma(p));
            Rgba([to_u8(r), to_u8(g), to_u8(b), p[3]])
        });
        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::test_support::sample_image;
    use image::RgbaImage;

    fn intensity(v: f64) -> NativeParameters {
        NativeParameters {
            intensity: Some(v),
            ..Default::default()
        }
    }

    #[test]
    fn test_sepia_zero_intensity_is_identity() {
        let img = sample_image(8, 8);
        let out = SepiaTone.render(&img, &intensity(0.0)).unwrap();
        assert_eq!(out.image.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_sepia_white_pixel() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));
        let out = SepiaTone.render(&img, &intensity(2.0)).unwrap().image.to_rgba8();
        // Red and green saturate, blue lands on the matrix row sum.
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 239, 255]));
    }

    #[test]
    fn test_vignette_keeps_center_and_darkens_corner() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(21, 21, Rgba([200, 200, 200, 255])));
        let params = NativeParameters {
            intensity: Some(10.0),
            radius: Some(50.0),
            scale: None,
        };
        let out = Vignette.render(&img, &params).unwrap().image.to_rgba8();
        assert_eq!(out.get_pixel(10, 10)[0], 200);
        assert!(out.get_pixel(0, 0)[0] < 20);
    }

    #[test]
    fn test_xray_inverts() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let out = XRay.render(&img, &NativeParameters::default()).unwrap().image.to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([209, 237, 255, 128]));
    }

    #[test]
    fn test_thermal_palette_ends() {
        assert_eq!(thermal_color(0.0), [0.0, 0.0, 0.0]);
        assert_eq!(thermal_color(255.0), [255.0, 255.0, 255.0]);
    }
}
