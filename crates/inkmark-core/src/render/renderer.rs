//! The watermark renderer: upsample, lay out, paint, composite, encode.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use serde::Serialize;
use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::error::{RenderError, RenderResult};
use crate::pipeline::{encode_jpeg, flatten, ImageDecoder};
use crate::settings::{Rgb, WatermarkSettings};

use super::font::{FontCatalog, GlyphFitter};
use super::luminance::LuminanceClassifier;
use super::overlay::{composite, paint_mask};

/// Both axes are scaled by this factor, nearest-neighbor.
pub const UPSCALE_FACTOR: u32 = 2;

/// Distance of the text box from the right and bottom edges, as a fraction
/// of the upsampled width and height.
pub const MARGIN_FRACTION: f64 = 0.05;

/// Outline drawn around the glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub width: u32,
}

/// Where and how the watermark was drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatermarkLayout {
    /// Upper bound for the text box's larger side
    pub target: u32,
    /// Chosen em size (or bitmap cell size)
    pub font_size: u32,
    /// Whether the built-in bitmap face was used
    pub builtin_face: bool,
    /// Ink box width in pixels
    pub text_width: u32,
    /// Ink box height in pixels
    pub text_height: u32,
    /// Ink box left edge on the upsampled image
    pub left: i64,
    /// Ink box top edge on the upsampled image
    pub top: i64,
    /// Fill color actually used
    pub fill: Rgb,
    /// Stroke, when enabled
    pub stroke: Option<StrokeStyle>,
    /// Alpha of fill and stroke
    pub opacity: u8,
}

/// A composited RGBA image together with its layout.
pub struct Composition {
    pub image: RgbaImage,
    pub layout: WatermarkLayout,
}

/// `floor(min(width, height) * size_percent)`.
pub fn target_dimension(width: u32, height: u32, size_percent: f64) -> u32 {
    (width.min(height) as f64 * size_percent).floor() as u32
}

/// Top-left of a `text_width` x `text_height` box whose bottom-right corner
/// sits the proportional margin inward from the image's bottom-right corner.
pub fn anchor_bottom_right(
    image_width: u32,
    image_height: u32,
    text_width: u32,
    text_height: u32,
) -> (i64, i64) {
    let margin_x = (image_width as f64 * MARGIN_FRACTION) as i64;
    let margin_y = (image_height as f64 * MARGIN_FRACTION) as i64;
    (
        image_width as i64 - text_width as i64 - margin_x,
        image_height as i64 - text_height as i64 - margin_y,
    )
}

/// Renders text watermarks onto images.
///
/// Holds no per-call state; one renderer can serve any number of jobs.
#[derive(Clone)]
pub struct WatermarkRenderer {
    fonts: Arc<FontCatalog>,
    decoder: ImageDecoder,
}

impl WatermarkRenderer {
    /// Create a renderer over a loaded font catalog.
    pub fn new(fonts: Arc<FontCatalog>, limits: LimitsConfig) -> Self {
        Self {
            fonts,
            decoder: ImageDecoder::new(limits),
        }
    }

    pub fn fonts(&self) -> &FontCatalog {
        &self.fonts
    }

    /// Decode `bytes`, burn in `text`, and return JPEG bytes.
    pub fn render(
        &self,
        bytes: &[u8],
        text: &str,
        settings: &WatermarkSettings,
    ) -> RenderResult<Vec<u8>> {
        let start = std::time::Instant::now();
        tracing::debug!("Rendering {} byte image", bytes.len());

        let decoded = self.decoder.decode(bytes)?;
        let composition = self.compose(&decoded.image, text, settings)?;
        let output = encode_jpeg(&flatten(composition.image))?;

        tracing::debug!(
            "Rendered {}x{} -> {} bytes in {:?}",
            decoded.width,
            decoded.height,
            output.len(),
            start.elapsed()
        );
        Ok(output)
    }

    /// Upsample `image` and composite the watermark onto it.
    pub fn compose(
        &self,
        image: &DynamicImage,
        text: &str,
        settings: &WatermarkSettings,
    ) -> RenderResult<Composition> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }

        // Classify before upsampling: same result on a quarter of the pixels.
        let luma = settings
            .auto_color
            .then(|| LuminanceClassifier::classify(image));

        let (up_width, up_height) = match (
            width.checked_mul(UPSCALE_FACTOR),
            height.checked_mul(UPSCALE_FACTOR),
        ) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(RenderError::ImageTooLarge {
                    width,
                    height,
                    max_dim: u32::MAX / UPSCALE_FACTOR,
                })
            }
        };
        let mut base = image
            .resize_exact(up_width, up_height, FilterType::Nearest)
            .into_rgba8();

        let target = target_dimension(up_width, up_height, settings.size_percent);
        let face = GlyphFitter::new(&self.fonts).fit(text, target);
        let mask = face.rasterize(text);
        let (left, top) = anchor_bottom_right(up_width, up_height, mask.width(), mask.height());

        let (fill, inverse) = match luma {
            Some(class) => (class.foreground, class.inverse),
            None => (settings.color, settings.color.inverted()),
        };
        let stroke = settings.stroke_enabled.then(|| StrokeStyle {
            color: inverse,
            width: settings.stroke_width,
        });

        let mut overlay = RgbaImage::new(up_width, up_height);
        if let Some(stroke) = stroke {
            let outline = mask.dilate(stroke.width);
            let offset = stroke.width as i64;
            paint_mask(
                &mut overlay,
                &outline,
                left - offset,
                top - offset,
                stroke.color.with_alpha(settings.opacity),
            );
        }
        paint_mask(
            &mut overlay,
            &mask,
            left,
            top,
            fill.with_alpha(settings.opacity),
        );
        composite(&mut base, &overlay);

        let layout = WatermarkLayout {
            target,
            font_size: face.size(),
            builtin_face: face.is_builtin(),
            text_width: mask.width(),
            text_height: mask.height(),
            left,
            top,
            fill,
            stroke,
            opacity: settings.opacity,
        };
        tracing::debug!(?layout, "Watermark composed");

        Ok(Composition {
            image: base,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb as Pixel, RgbImage, Rgba};

    fn renderer() -> WatermarkRenderer {
        WatermarkRenderer::new(Arc::new(FontCatalog::empty()), LimitsConfig::default())
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Pixel(color)))
    }

    #[test]
    fn test_target_dimension_uses_shorter_side() {
        assert_eq!(target_dimension(200, 100, 0.3), 30);
        assert_eq!(target_dimension(20, 20, 0.3), 6);
        assert_eq!(target_dimension(1000, 700, 0.7), 490);
        assert_eq!(target_dimension(100, 100, 1.0), 100);
    }

    #[test]
    fn test_anchor_bottom_right() {
        assert_eq!(anchor_bottom_right(200, 100, 50, 20), (140, 75));
        assert_eq!(anchor_bottom_right(20, 20, 7, 7), (12, 12));
    }

    #[test]
    fn test_compose_doubles_dimensions() {
        let composition = renderer()
            .compose(&solid(10, 5, [0, 0, 0]), "hi", &WatermarkSettings::default())
            .unwrap();
        assert_eq!(composition.image.dimensions(), (20, 10));
    }

    #[test]
    fn test_nearest_upsample_keeps_hard_edges() {
        let mut src = RgbImage::from_pixel(2, 1, Pixel([0, 0, 0]));
        src.put_pixel(1, 0, Pixel([255, 255, 255]));
        let settings = WatermarkSettings {
            opacity: 0,
            ..Default::default()
        };
        let composition = renderer()
            .compose(&DynamicImage::ImageRgb8(src), "", &settings)
            .unwrap();
        let img = composition.image;
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(2, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(3, 1), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_auto_color_on_dark_image_is_white() {
        let settings = WatermarkSettings {
            auto_color: true,
            color: Rgb::new(10, 20, 30),
            ..Default::default()
        };
        let layout = renderer()
            .compose(&solid(40, 40, [0, 0, 0]), "A", &settings)
            .unwrap()
            .layout;
        assert_eq!(layout.fill, Rgb::WHITE);
    }

    #[test]
    fn test_auto_color_on_light_image_is_black() {
        let settings = WatermarkSettings {
            auto_color: true,
            ..Default::default()
        };
        let layout = renderer()
            .compose(&solid(40, 40, [255, 255, 255]), "A", &settings)
            .unwrap()
            .layout;
        assert_eq!(layout.fill, Rgb::BLACK);
    }

    #[test]
    fn test_manual_color_used_without_auto() {
        let settings = WatermarkSettings {
            color: Rgb::new(10, 20, 30),
            ..Default::default()
        };
        let layout = renderer()
            .compose(&solid(40, 40, [0, 0, 0]), "A", &settings)
            .unwrap()
            .layout;
        assert_eq!(layout.fill, Rgb::new(10, 20, 30));
        assert!(layout.stroke.is_none());
    }

    #[test]
    fn test_stroke_is_inverse_of_fill() {
        let settings = WatermarkSettings {
            stroke_enabled: true,
            stroke_width: 3,
            ..Default::default()
        };
        let layout = renderer()
            .compose(&solid(40, 40, [0, 0, 255]), "A", &settings)
            .unwrap()
            .layout;
        assert_eq!(layout.fill, Rgb::WHITE);
        assert_eq!(
            layout.stroke,
            Some(StrokeStyle {
                color: Rgb::BLACK,
                width: 3
            })
        );
    }

    #[test]
    fn test_stroke_follows_auto_color() {
        let settings = WatermarkSettings {
            auto_color: true,
            stroke_enabled: true,
            ..Default::default()
        };
        let layout = renderer()
            .compose(&solid(40, 40, [250, 250, 250]), "A", &settings)
            .unwrap()
            .layout;
        assert_eq!(layout.fill, Rgb::BLACK);
        assert_eq!(layout.stroke.map(|s| s.color), Some(Rgb::WHITE));
    }

    #[test]
    fn test_stroke_paints_outside_glyph() {
        let plain = WatermarkSettings {
            opacity: 255,
            ..Default::default()
        };
        let stroked = WatermarkSettings {
            stroke_enabled: true,
            stroke_width: 2,
            ..plain
        };
        let base = solid(40, 40, [255, 0, 0]);
        let a = renderer().compose(&base, "X", &plain).unwrap().image;
        let b = renderer().compose(&base, "X", &stroked).unwrap().image;
        // The stroke reaches pixels the plain glyph never touches.
        let untouched_by_plain = a
            .pixels()
            .zip(b.pixels())
            .filter(|(pa, pb)| **pa == Rgba([255, 0, 0, 255]) && **pb != **pa)
            .count();
        assert!(untouched_by_plain > 0);
    }

    #[test]
    fn test_builtin_face_when_target_below_floor() {
        let layout = renderer()
            .compose(&solid(10, 10, [255, 0, 0]), "X", &WatermarkSettings::default())
            .unwrap()
            .layout;
        assert_eq!(layout.target, 6);
        assert!(layout.builtin_face);
        assert_eq!((layout.text_width, layout.text_height), (7, 7));
        assert_eq!((layout.left, layout.top), (12, 12));
    }

    #[test]
    fn test_empty_image_rejected() {
        let err = renderer()
            .compose(&DynamicImage::new_rgb8(0, 3), "A", &WatermarkSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::EmptyImage { .. }));
    }

    #[test]
    fn test_render_reports_decode_error() {
        let err = renderer()
            .render(b"garbage", "A", &WatermarkSettings::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }

    #[test]
    fn test_empty_text_leaves_image_unchanged() {
        let base = solid(8, 8, [9, 99, 199]);
        let composition = renderer()
            .compose(&base, "", &WatermarkSettings::default())
            .unwrap();
        assert!(composition
            .image
            .pixels()
            .all(|p| *p == Rgba([9, 99, 199, 255])));
    }
}
