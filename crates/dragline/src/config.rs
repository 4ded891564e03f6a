#![forbid(unsafe_code)]

//! Plain-data drag options.
//!
//! [`DragConfig`] holds every non-callback option of a drag controller so it
//! can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # dragline.toml
//! copy = false
//! revert_on_spill = true
//! direction = "horizontal"
//! slide_factor_x = 4.0
//! slide_factor_y = 4.0
//! ```
//!
//! ```rust,ignore
//! let config = DragConfig::from_toml_file("dragline.toml")?.validated()?;
//! let config = DragConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Missing fields take the values of [`DragConfig::default()`].

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dragline_core::geometry::Direction;
use dragline_core::gesture::SlideThreshold;

/// Options that are plain data (no callbacks).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DragConfig {
    /// Drag a deep copy instead of the original. A `copy_when` callback on
    /// `DragOptions` overrides this per drag.
    pub copy: bool,

    /// When a drag copies, allow the copy to be sorted inside its source
    /// container.
    pub copy_sort_source: bool,

    /// A spilled subject goes back where it came from.
    pub revert_on_spill: bool,

    /// A spilled subject is removed from the tree.
    pub remove_on_spill: bool,

    /// Axis used to resolve insertion points.
    pub direction: Direction,

    /// Do not start a drag while the pointer is over a text input, so text
    /// can still be selected inside draggable items.
    pub ignore_input_text_selection: bool,

    /// Horizontal slack (client units) a press must slide before dragging.
    pub slide_factor_x: f64,

    /// Vertical slack (client units) a press must slide before dragging.
    pub slide_factor_y: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            copy: false,
            copy_sort_source: false,
            revert_on_spill: false,
            remove_on_spill: false,
            direction: Direction::Vertical,
            ignore_input_text_selection: true,
            slide_factor_x: 0.0,
            slide_factor_y: 0.0,
        }
    }
}

impl DragConfig {
    /// Slide gate built from the slide factors.
    #[must_use]
    pub fn slide_threshold(&self) -> SlideThreshold {
        SlideThreshold::new(self.slide_factor_x, self.slide_factor_y)
    }

    /// Parse from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Collect every problem with this configuration. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("slide_factor_x", self.slide_factor_x),
            ("slide_factor_y", self.slide_factor_y),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }
        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing, else the list.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating a [`DragConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
