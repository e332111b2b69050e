//! The `ImageFilter` trait implemented by every filter in the engine.
//!
//! Filters are stateless. The parameters for a render are passed explicitly
//! with each call instead of being set on a shared mutable filter object, so
//! one filter instance can serve any number of renders.

use crate::core::params::{AcceptedParameters, NativeParameters, ParameterKind};
use crate::core::types::Extent;
use crate::filters::variant::FilterVariant;
use image::DynamicImage;

/// What a filter produced: pixels plus the extent they are valid over.
///
/// The extent may be smaller than the image (e.g. when a filter leaves an
/// invalid border); the pipeline crops to it before display.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Filtered image
    pub image: DynamicImage,
    /// Region of `image` holding the result
    pub extent: Extent,
}

impl FilterOutput {
    /// Output whose extent is the whole image.
    pub fn full(image: DynamicImage) -> Self {
        let extent = Extent::of(&image);
        Self { image, extent }
    }
}

/// Failure reported by a filter implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FilterFailure(pub String);

/// A single filter of the engine.
pub trait ImageFilter: Send + Sync {
    /// Which catalog entry this filter implements.
    fn variant(&self) -> FilterVariant;

    /// The parameter kinds this implementation actually reads.
    fn input_keys(&self) -> &'static [ParameterKind];

    /// Run the filter.
    fn render(
        &self,
        image: &DynamicImage,
        params: &NativeParameters,
    ) -> Result<FilterOutput, FilterFailure>;

    /// `input_keys` as flags.
    fn accepted(&self) -> AcceptedParameters {
        AcceptedParameters::from_kinds(self.input_keys())
    }
}
