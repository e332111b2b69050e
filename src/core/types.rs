//! Image value types that flow through the pipeline.
//!
//! Source images are shared behind an `Arc` so that the session, the loader
//! and the render worker can hold the same decoded bitmap without copying.
//! Rendered images are owned RGBA8 buffers ready for display or export.

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::params::NativeParameters;
use crate::filters::variant::FilterVariant;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Image metadata without the pixel data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded format the image was decoded from
    pub format: ImageFormat,
    /// Whether the image has an alpha channel
    pub has_alpha: bool,
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG
    Jpeg,
    /// PNG
    #[default]
    Png,
    /// GIF
    Gif,
    /// WebP
    WebP,
    /// TIFF
    Tiff,
    /// BMP
    Bmp,
    /// Decoded but not encodable
    Unknown,
}

impl ImageFormat {
    /// Map to the `image` crate's format, if it can be encoded.
    pub fn to_image_format(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Unknown => None,
        }
    }

    /// MIME type used for data URLs.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

impl From<image::ImageFormat> for ImageFormat {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::WebP => ImageFormat::WebP,
            image::ImageFormat::Tiff => ImageFormat::Tiff,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            _ => ImageFormat::Unknown,
        }
    }
}

/// Rectangular bounds of a processed image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Extent {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Extent {
    /// Extent covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Extent of an image's full bounds.
    pub fn of(image: &DynamicImage) -> Self {
        Self::full(image.width(), image.height())
    }

    /// True if the extent has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if this extent fits inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

fn has_alpha(image: &DynamicImage) -> bool {
    image.color().has_alpha()
}

/// A decoded source image. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Image metadata (dimensions, format, etc.)
    pub metadata: ImageMetadata,
    data: Arc<DynamicImage>,
}

impl SourceImage {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self::with_format(image, ImageFormat::Unknown)
    }

    fn with_format(image: DynamicImage, format: ImageFormat) -> Self {
        let metadata = ImageMetadata {
            width: image.width(),
            height: image.height(),
            format,
            has_alpha: has_alpha(&image),
        };
        Self {
            metadata,
            data: Arc::new(image),
        }
    }

    /// Decode from encoded bytes, guessing the format from content.
    pub fn decode(bytes: &[u8]) -> PipelineResult<Self> {
        let format = image::guess_format(bytes)?;
        let image = image::load_from_memory_with_format(bytes, format)?;
        Ok(Self::with_format(image, format.into()))
    }

    /// Read and decode a file.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    /// The decoded pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.data
    }

    /// Shared handle to the decoded pixels.
    pub fn shared(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.metadata.height
    }
}

/// The output of one render: pixels plus the inputs that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    /// Filter that produced the image.
    pub variant: FilterVariant,
    /// Native parameters the filter ran with.
    pub parameters: NativeParameters,
    pixels: RgbaImage,
}

impl RenderedImage {
    /// Wrap a rasterized buffer.
    pub fn new(variant: FilterVariant, parameters: NativeParameters, pixels: RgbaImage) -> Self {
        Self {
            variant,
            parameters,
            pixels,
        }
    }

    /// The rendered pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume into the pixel buffer.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Encode into `format` for sharing.
    pub fn encode(&self, format: ImageFormat) -> PipelineResult<Vec<u8>> {
        let target = format
            .to_image_format()
            .ok_or_else(|| PipelineError::Rasterize(format!("cannot encode as {:?}", format)))?;

        // JPEG has no alpha channel.
        let image = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8())
        } else {
            DynamicImage::ImageRgba8(self.pixels.clone())
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, target)
            .map_err(|e| PipelineError::Rasterize(format!("failed to encode: {}", e)))?;
        Ok(buffer.into_inner())
    }

    /// PNG data URL, suitable as a share preview.
    pub fn to_data_url(&self) -> PipelineResult<String> {
        let bytes = self.encode(ImageFormat::Png)?;
        Ok(format!(
            "data:{};base64,{}",
            ImageFormat::Png.mime_type(),
            BASE64.encode(bytes)
        ))
    }

    /// Write to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        let path = path.as_ref();
        let format = image::ImageFormat::from_path(path)
            .map(ImageFormat::from)
            .unwrap_or_default();
        let bytes = self.encode(format)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_extent_bounds() {
        let extent = Extent { x: 2, y: 2, width: 4, height: 4 };
        assert!(extent.fits_within(6, 6));
        assert!(!extent.fits_within(5, 6));
        assert!(Extent::full(0, 10).is_empty());
        assert_eq!(extent.to_string(), "4x4+2+2");
    }

    #[test]
    fn test_decode_round_trip_metadata() {
        let rendered = RenderedImage::new(FilterVariant::XRay, NativeParameters::default(), checker(4, 3));
        let bytes = rendered.encode(ImageFormat::Png).unwrap();

        let source = SourceImage::decode(&bytes).unwrap();
        assert_eq!(source.width(), 4);
        assert_eq!(source.height(), 3);
        assert_eq!(source.metadata.format, ImageFormat::Png);
        assert!(source.metadata.has_alpha);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = SourceImage::decode(b"definitely not an image");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_data_url() {
        let rendered = RenderedImage::new(FilterVariant::XRay, NativeParameters::default(), checker(2, 2));
        let url = rendered.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_save_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let rendered = RenderedImage::new(FilterVariant::Edges, NativeParameters::default(), checker(8, 8));
        rendered.save(&path).unwrap();

        let source = SourceImage::open(&path).unwrap();
        assert_eq!(source.metadata.format, ImageFormat::Jpeg);
        assert_eq!(source.width(), 8);
    }
}
