//! Error types for Instafilter.
//!
//! Uses thiserror for structured errors with context. Pipeline errors are
//! all recoverable: a failed render leaves the previously rendered image in
//! place instead of propagating up to the caller as a crash.

use crate::filters::variant::{FilterVariant, UnknownFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for Instafilter.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum InstafilterError {
    /// Loading, filtering or rasterizing failed
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The key-value store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A filter name did not match the catalog
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilter),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Errors produced while loading, filtering or rasterizing an image.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The filter engine returned an error or was missing
    #[error("Filter {variant} produced no output: {reason}")]
    FilterExecution {
        /// Filter that failed
        variant: FilterVariant,
        /// Engine message
        reason: String,
    },

    /// The filter output has zero area
    #[error("Filter {variant} produced an empty extent")]
    EmptyExtent {
        /// Filter that produced nothing
        variant: FilterVariant,
    },

    /// The output could not be converted to RGBA8
    #[error("Cannot rasterize output: {0}")]
    Rasterize(String),

    /// Reading the source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store file could not be read or written
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file is not a JSON object of integers
    #[error("Store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid {
        /// Config key
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl PipelineError {
    /// The filter that failed, if the error came from filter execution.
    pub fn variant(&self) -> Option<FilterVariant> {
        match self {
            PipelineError::FilterExecution { variant, .. }
            | PipelineError::EmptyExtent { variant } => Some(*variant),
            _ => None,
        }
    }

    /// Whether the caller can keep going after this error.
    ///
    /// Nothing in the pipeline is fatal; the caller keeps its previous image.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Short classification used in log lines and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) | PipelineError::Io(_) => "decode",
            PipelineError::FilterExecution { .. } | PipelineError::EmptyExtent { .. } => {
                "filter_execution"
            }
            PipelineError::Rasterize(_) => "rasterize",
        }
    }
}

/// Result type alias for Instafilter operations.
pub type InstafilterResult<T> = Result<T, InstafilterError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
