//! Application configuration loaded from TOML.
//!
//! ```toml
//! default_filter = "sepia_tone"
//! default_intensity = 0.5
//! default_radius = 0.5
//! review_threshold = 20
//! store_path = "instafilter-state.json"
//! output_format = "png"
//! ```

use crate::core::error::ConfigError;
use crate::core::types::ImageFormat;
use crate::filters::variant::FilterVariant;
use crate::session::review::DEFAULT_REVIEW_THRESHOLD;
use crate::session::state::FilterState;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "instafilter.toml";

/// Runtime configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Filter selected when a session starts.
    pub default_filter: FilterVariant,
    /// Initial intensity slider position.
    pub default_intensity: f64,
    /// Initial radius slider position.
    pub default_radius: f64,
    /// Filter changes before a review is requested.
    pub review_threshold: u32,
    /// Key-value store for the review counter.
    pub store_path: PathBuf,
    /// Format used when exporting without an explicit extension.
    pub output_format: ImageFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_filter: FilterVariant::default(),
            default_intensity: 0.5,
            default_radius: 0.5,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            store_path: PathBuf::from("instafilter-state.json"),
            output_format: ImageFormat::Png,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` if given, else from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("default_intensity", self.default_intensity)?;
        check_unit("default_radius", self.default_radius)?;
        if self.review_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "review_threshold".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.output_format.to_image_format().is_none() {
            return Err(ConfigError::Invalid {
                field: "output_format".to_string(),
                reason: "format cannot be encoded".to_string(),
            });
        }
        Ok(())
    }

    /// Initial filter state for new sessions.
    pub fn initial_state(&self) -> FilterState {
        FilterState::new(self.default_filter, self.default_intensity, self.default_radius)
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: format!("{} is outside [0, 1]", value),
        })
    }
}
