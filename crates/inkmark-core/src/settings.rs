//! Watermark settings: the per-credential record that drives rendering.
//!
//! Settings are total. Every field missing from a stored record is filled
//! from [`WatermarkSettings::default`] when the record is deserialized, so the
//! engine never looks a field up with a fallback at use time.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted `size_percent`.
pub const MIN_SIZE_PERCENT: f64 = 0.1;
/// Largest accepted `size_percent`.
pub const MAX_SIZE_PERCENT: f64 = 1.0;
/// Smallest accepted stroke width in pixels.
pub const MIN_STROKE_WIDTH: u32 = 1;
/// Largest accepted stroke width in pixels.
pub const MAX_STROKE_WIDTH: u32 = 10;

/// An 8-bit RGB color.
///
/// Serialized flat as `color_r`, `color_g`, `color_b` so it can be embedded
/// in [`WatermarkSettings`] without nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rgb {
    #[serde(rename = "color_r")]
    pub r: u8,
    #[serde(rename = "color_g")]
    pub g: u8,
    #[serde(rename = "color_b")]
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise complement (`255 - c`).
    pub const fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// The color with an alpha channel attached.
    pub fn with_alpha(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }

    /// Parse `"R,G,B"` or `"R G B"` (each 0-255).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<u8> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u8>().ok())
            .collect::<Option<_>>()?;
        match parts.as_slice() {
            [r, g, b] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

/// How a watermark is sized, colored and outlined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    /// Fraction of the shorter upsampled side the text box may occupy
    pub size_percent: f64,

    /// Fill color, ignored when `auto_color` is set
    #[serde(flatten)]
    pub color: Rgb,

    /// Alpha applied to the fill and the stroke
    pub opacity: u8,

    /// Derive the fill color from image luminance
    pub auto_color: bool,

    /// Draw an outline around the glyphs
    pub stroke_enabled: bool,

    /// Outline width in pixels
    pub stroke_width: u32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            size_percent: 0.3,
            color: Rgb::WHITE,
            opacity: 128,
            auto_color: false,
            stroke_enabled: false,
            stroke_width: 2,
        }
    }
}

impl WatermarkSettings {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIZE_PERCENT..=MAX_SIZE_PERCENT).contains(&self.size_percent) {
            return Err(ConfigError::ValidationError(format!(
                "watermark.size_percent must be between {MIN_SIZE_PERCENT} and {MAX_SIZE_PERCENT}, got {}",
                self.size_percent
            )));
        }
        if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&self.stroke_width) {
            return Err(ConfigError::ValidationError(format!(
                "watermark.stroke_width must be between {MIN_STROKE_WIDTH} and {MAX_STROKE_WIDTH}, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }

    /// Opacity as a whole percentage, for display.
    pub fn opacity_percent(&self) -> u32 {
        self.opacity as u32 * 100 / 255
    }
}
