//! Execution module.
//!
//! Contains the reprocessing pipeline, the background image loader and the
//! coalescing render worker.

pub mod loader;
pub mod pipeline;
pub mod worker;

pub use loader::{ImageLoader, LoadHandle};
pub use pipeline::{map_parameters, Pipeline};
pub use worker::{RenderOutcome, RenderRequest, RenderWorker};
