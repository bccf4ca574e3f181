//! Stored watermark profiles: one record per credential.
//!
//! Records live in a JSON array. Every record carries the credential token,
//! the watermark text and a settings object; partial or absent settings are
//! merged over the defaults when the file is read.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InkmarkError, Result};
use crate::settings::WatermarkSettings;

/// A persisted (credential, text, settings) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkProfile {
    /// Opaque credential identifying the owner
    #[serde(default)]
    pub token: String,

    /// Text burned into images
    #[serde(default)]
    pub watermark: String,

    /// Rendering settings
    #[serde(default)]
    pub settings: WatermarkSettings,
}

impl WatermarkProfile {
    pub fn new(token: impl Into<String>, watermark: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            watermark: watermark.into(),
            settings: WatermarkSettings::default(),
        }
    }
}

/// Read every profile from `path`.
///
/// A missing file is an empty store. Records without a token are dropped.
pub fn load_profiles(path: &Path) -> Result<Vec<WatermarkProfile>> {
    if !path.exists() {
        tracing::info!("Profile store {:?} not found, starting empty", path);
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let records: Vec<WatermarkProfile> = serde_json::from_str(&content)?;
    let total = records.len();

    let profiles: Vec<WatermarkProfile> = records
        .into_iter()
        .filter(|p| {
            if p.token.is_empty() {
                tracing::warn!("Skipping profile record without a token");
                false
            } else {
                true
            }
        })
        .collect();

    for profile in &profiles {
        profile.settings.validate().map_err(InkmarkError::Config)?;
    }

    tracing::info!("Loaded {} of {} profile(s) from {:?}", profiles.len(), total, path);
    Ok(profiles)
}

/// Write `profiles` to `path` as a pretty-printed JSON array.
pub fn save_profiles(path: &Path, profiles: &[WatermarkProfile]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(profiles)?;
    std::fs::write(path, json)?;
    tracing::debug!("Saved {} profile(s) to {:?}", profiles.len(), path);
    Ok(())
}
