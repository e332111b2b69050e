//! Core types shared by the filters, the pipeline and the session:
//! image values, parameter scaling and error types.

pub mod error;
pub mod params;
pub mod types;

// Re-export commonly used types
pub use error::{InstafilterError, PipelineError, SessionId};
pub use params::{AcceptedParameters, NativeParameters, ParameterKind};
pub use types::{Extent, ImageFormat, ImageMetadata, RenderedImage, SourceImage};
