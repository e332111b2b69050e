//! Filter module.
//!
//! Contains the filter catalog, the capability registry and the built-in
//! engine filters.

pub mod builtin;
pub mod engine;
pub mod registry;
pub mod variant;

pub use engine::{FilterFailure, FilterOutput, ImageFilter};
pub use registry::{lookup, CapabilityReport, FilterRegistry};
pub use variant::FilterVariant;
