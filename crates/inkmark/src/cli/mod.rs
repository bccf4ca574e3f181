//! Command implementations.

pub mod config;
pub mod preview;
pub mod render;

use clap::Args;
use inkmark_core::{Rgb, WatermarkSettings};

/// Watermark flags shared by `render` and `preview`.
///
/// Every flag is optional and overrides the `[watermark]` section of the
/// config file.
#[derive(Args, Debug, Default, Clone)]
pub struct WatermarkArgs {
    /// Fraction of the shorter side the text may occupy (0.1 - 1.0)
    #[arg(long)]
    pub size: Option<f64>,

    /// Fill color as R,G,B
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Rgb>,

    /// Alpha of fill and stroke (0 - 255)
    #[arg(long)]
    pub opacity: Option<u8>,

    /// Pick black or white text from image brightness
    #[arg(long)]
    pub auto_color: bool,

    /// Outline the text in the inverse of the fill color
    #[arg(long)]
    pub stroke: bool,

    /// Outline width in pixels (1 - 10)
    #[arg(long)]
    pub stroke_width: Option<u32>,
}

impl WatermarkArgs {
    /// Layer the flags over `base` and validate the result.
    pub fn apply(&self, base: WatermarkSettings) -> anyhow::Result<WatermarkSettings> {
        let mut settings = base;
        if let Some(size) = self.size {
            settings.size_percent = size;
        }
        if let Some(color) = self.color {
            settings.color = color;
        }
        if let Some(opacity) = self.opacity {
            settings.opacity = opacity;
        }
        if self.auto_color {
            settings.auto_color = true;
        }
        if self.stroke {
            settings.stroke_enabled = true;
        }
        if let Some(width) = self.stroke_width {
            settings.stroke_width = width;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::parse(s).ok_or_else(|| format!("expected R,G,B with each 0-255, got {s:?}"))
}
