//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Font lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font files tried in order; the first one that loads and fits wins.
    /// A leading `~` is expanded.
    pub candidates: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                "Roboto.ttf".to_string(),
                "./Roboto.ttf".to_string(),
                "fonts/Roboto.ttf".to_string(),
                "/usr/share/fonts/truetype/roboto/Roboto-Regular.ttf".to_string(),
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
                "/System/Library/Fonts/Supplemental/Arial.ttf".to_string(),
            ],
        }
    }
}

impl FontConfig {
    /// Candidate paths with `~` expanded.
    pub fn resolved_candidates(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|c| PathBuf::from(shellexpand::tilde(c).into_owned()))
            .collect()
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input size (image or archive) in megabytes
    pub max_file_size_mb: u64,

    /// Maximum source image dimension (width or height), before upsampling
    pub max_image_dimension: u32,

    /// Wall-clock bound for one job run through the async facade
    pub render_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            render_timeout_ms: 60000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
