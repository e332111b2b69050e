//! # Instafilter - Photo Filter Core
//!
//! Instafilter applies one of a fixed set of photo filters to an image, with
//! the filter's numeric parameters driven by two normalized sliders.
//!
//! ## Features
//!
//! - **Fixed catalog**: ten filters, each declaring which of intensity,
//!   radius and scale it accepts
//! - **Deterministic pipeline**: the same inputs always render the same bytes
//! - **Explicit sessions**: caller-owned state, no globals
//! - **Background loading**: decode on a worker pool, one completion channel
//!   per load
//! - **Coalescing renders**: a serial worker where the latest request wins
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use instafilter::prelude::*;
//!
//! let source = ImageLoader::load_path("input.jpg").recv()?;
//!
//! let mut session = EditSession::new(Pipeline::with_builtins());
//! session.set_source(source)?;
//! session.set_filter(FilterVariant::Pixellate);
//! session.set_intensity(0.7)?;
//!
//! if let Some(rendered) = session.rendered() {
//!     rendered.save("output.png")?;
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: image values, parameter scaling and error types
//! - [`filters`]: filter catalog, capability registry and built-in filters
//! - [`execution`]: pipeline, image loader and render worker
//! - [`session`]: edit sessions, review tracking and the key-value store
//! - [`config`]: TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod filters;
pub mod session;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use instafilter::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::params::{AcceptedParameters, NativeParameters, ParameterKind};
    pub use crate::core::types::{Extent, ImageFormat, ImageMetadata, RenderedImage, SourceImage};

    // Errors
    pub use crate::core::error::{
        ConfigError, InstafilterError, PipelineError, SessionId, StoreError,
    };

    // Filters
    pub use crate::filters::engine::{FilterFailure, FilterOutput, ImageFilter};
    pub use crate::filters::registry::{lookup, CapabilityReport, FilterRegistry};
    pub use crate::filters::variant::FilterVariant;

    // Execution
    pub use crate::execution::loader::{ImageLoader, LoadHandle};
    pub use crate::execution::pipeline::{map_parameters, Pipeline};
    pub use crate::execution::worker::{RenderOutcome, RenderRequest, RenderWorker};

    // Session
    pub use crate::session::{
        EditSession, FilterState, JsonFileStore, KeyValueStore, MemoryStore, ReviewDecision,
        ReviewTracker,
    };

    // Config
    pub use crate::config::Config;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "instafilter");
    }

    #[test]
    fn test_load_filter_export() {
        let png = RenderedImage::new(
            FilterVariant::Thermal,
            NativeParameters::default(),
            image::RgbaImage::from_fn(20, 10, |x, y| image::Rgba([(x * 12) as u8, (y * 25) as u8, 90, 255])),
        )
        .encode(ImageFormat::Png)
        .unwrap();

        let source = ImageLoader::spawn(png).recv().unwrap();

        let mut session = EditSession::new(Pipeline::with_builtins());
        session.set_source(source).unwrap();
        session.set_filter(FilterVariant::Pixellate);
        session.set_intensity(0.7).unwrap();

        let rendered = session.rendered().unwrap();
        assert_eq!(rendered.parameters.scale, Some(7.0));
        assert!(rendered.to_data_url().unwrap().starts_with("data:image/png"));
    }
}
