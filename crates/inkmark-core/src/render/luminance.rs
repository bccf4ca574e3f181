//! Automatic watermark color from perceptual image brightness.

use image::DynamicImage;

use crate::settings::Rgb;

/// Average luma below this selects a white foreground, otherwise black.
pub const LUMA_THRESHOLD: f64 = 128.0;

/// Outcome of classifying an image by brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaClass {
    /// Mean of `0.299R + 0.587G + 0.114B` over every pixel
    pub average_luma: f64,
    /// Text color that contrasts with the image
    pub foreground: Rgb,
    /// Complement of `foreground`, used for the stroke
    pub inverse: Rgb,
}

/// Derives a contrasting foreground color from image brightness.
pub struct LuminanceClassifier;

impl LuminanceClassifier {
    /// Mean perceptual luma over every pixel (full scan, no sampling).
    ///
    /// Returns 0.0 for an image without pixels; callers reject those before
    /// rendering.
    pub fn average_luma(image: &DynamicImage) -> f64 {
        let rgb = image.to_rgb8();
        let count = rgb.width() as u64 * rgb.height() as u64;
        if count == 0 {
            return 0.0;
        }

        let total: f64 = rgb
            .pixels()
            .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
            .sum();
        total / count as f64
    }

    /// Classify an image: dark images get white text, light images black.
    pub fn classify(image: &DynamicImage) -> LumaClass {
        let average_luma = Self::average_luma(image);
        let foreground = if average_luma < LUMA_THRESHOLD {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        };
        tracing::debug!(
            "Average luma {:.2} -> foreground {}",
            average_luma,
            foreground
        );
        LumaClass {
            average_luma,
            foreground,
            inverse: foreground.inverted(),
        }
    }
}
