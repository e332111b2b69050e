//! Sharpen filters.

use super::blur::blur_rgba;
use super::{map_pixels, to_u8};
use crate::core::params::{NativeParameters, ParameterKind};
use crate::filters::engine::{FilterFailure, FilterOutput, ImageFilter};
use crate::filters::registry::FilterRegistry;
use crate::filters::variant::FilterVariant;
use image::{DynamicImage, Rgba};

/// Register sharpen filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(UnsharpMask);
}

/// Sharpens by adding back the difference between the image and a blurred copy.
///
/// `out = src + intensity * (src - blur(src, radius))`
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsharpMask;

impl UnsharpMask {
    /// Blur radius used when none is supplied.
    pub const DEFAULT_RADIUS: f64 = 2.5;
    /// Sharpening amount used when none is supplied.
    pub const DEFAULT_INTENSITY: f64 = 0.5;
}

impl ImageFilter for UnsharpMask {
    fn variant(&self) -> FilterVariant {
        FilterVariant::UnsharpMask
    }

    fn input_keys(&self) -> &'static [ParameterKind] {
        &[ParameterKind::Intensity, ParameterKind::Radius]
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure> {
        let amount = params.intensity_or(Self::DEFAULT_INTENSITY).max(0.0) as f32;
        let radius = params.radius_or(Self::DEFAULT_RADIUS);

        let src = image.to_rgba8();
        let blurred = blur_rgba(&src, radius);

        let out = map_pixels(&src, |x, y, p| {
            let b = blurred.get_pixel(x, y);
            let sharpen = |c: usize| {
                let v = p[c] as f32;
                to_u8(v + amount * (v - b[c]))
            };
            Rgba([sharpen(0), sharpen(1), sharpen(2), p[3]])
        });

        Ok(FilterOutput::full(DynamicImage::ImageRgba8(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::test_support::sample_image;
    use image::RgbaImage;

    #[test]
    fn test_flat_image_unchanged() {
        let params = NativeParameters {
            intensity: Some(8.0),
            radius: Some(20.0),
            scale: None,
        };
        for alpha in [255, 90] {
            let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 12, Rgba([100, 150, 200, alpha])));
            let out = UnsharpMask.render(&img, &params).unwrap();
            assert_eq!(out.image.to_rgba8(), img.to_rgba8());
        }
    }

    #[test]
    fn test_sharpening_increases_contrast() {
        let img = sample_image(24, 24);
        let params = NativeParameters {
            intensity: Some(5.0),
            radius: Some(6.0),
            scale: None,
        };
        let out = UnsharpMask.render(&img, &params).unwrap().image.to_rgba8();
        assert_ne!(out, img.to_rgba8());
    }
}
