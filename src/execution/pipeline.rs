//! The reprocessing pipeline.
//!
//! `apply` maps two normalized slider values onto the parameters the chosen
//! filter accepts, runs the filter and rasterizes the result to the
//! filter's reported extent. It is deterministic: the same inputs always
//! produce byte-identical output.

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::params::NativeParameters;
use crate::core::types::{RenderedImage, SourceImage};
use crate::filters::engine::FilterOutput;
use crate::filters::registry::{lookup, FilterRegistry};
use crate::filters::variant::FilterVariant;
use image::{imageops, DynamicImage};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Native parameters `variant` will receive for the given slider positions.
///
/// Only accepted kinds are set; slider values are clamped into `[0, 1]`.
pub fn map_parameters(variant: FilterVariant, intensity_norm: f64, radius_norm: f64) -> NativeParameters {
    NativeParameters::from_sliders(lookup(variant), intensity_norm, radius_norm)
}

/// Crop a filter's output to its extent and convert it to RGBA8.
pub fn rasterize(variant: FilterVariant, output: FilterOutput) -> PipelineResult<image::RgbaImage> {
    let FilterOutput { image, extent } = output;

    if extent.is_empty() {
        return Err(PipelineError::EmptyExtent { variant });
    }
    if !extent.fits_within(image.width(), image.height()) {
        return Err(PipelineError::Rasterize(format!(
            "extent {} exceeds {}x{} output",
            extent,
            image.width(),
            image.height()
        )));
    }

    let full = extent.x == 0 && extent.y == 0 && extent.width == image.width() && extent.height == image.height();
    let rgba = match image {
        DynamicImage::ImageRgba8(buf) if full => buf,
        other if full => other.to_rgba8(),
        other => imageops::crop_imm(&other.to_rgba8(), extent.x, extent.y, extent.width, extent.height).to_image(),
    };
    Ok(rgba)
}

/// Runs filters from a registry against source images.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Arc<FilterRegistry>,
}

impl Pipeline {
    /// Pipeline over the given registry.
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self { registry }
    }

    /// Pipeline over the built-in filters.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(FilterRegistry::with_builtins()))
    }

    /// The registry backing this pipeline.
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Render `source` through `variant` at the given slider positions.
    pub fn apply(
        &self,
        source: &SourceImage,
        variant: FilterVariant,
        intensity_norm: f64,
        radius_norm: f64,
    ) -> PipelineResult<RenderedImage> {
        let start = Instant::now();

        let filter = self
            .registry
            .filter(variant)
            .ok_or_else(|| PipelineError::FilterExecution {
                variant,
                reason: "no engine filter registered".to_string(),
            })?;

        if source.width() == 0 || source.height() == 0 {
            return Err(PipelineError::EmptyExtent { variant });
        }

        let params = map_parameters(variant, intensity_norm, radius_norm);
        debug!("Applying {} with {}", variant, params);

        let output = filter
            .render(source.image(), &params)
            .map_err(|e| PipelineError::FilterExecution {
                variant,
                reason: e.to_string(),
            })?;

        let pixels = rasterize(variant, output)?;

        debug!(
            "Rendered {} at {}x{} in {}ms",
            variant,
            pixels.width(),
            pixels.height(),
            start.elapsed().as_millis()
        );

        Ok(RenderedImage::new(variant, params, pixels))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_builtins()
    }
}
