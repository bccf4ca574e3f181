//! Preview image: the watermark on a half-white, half-black canvas, so both
//! auto-color outcomes and the stroke can be checked at once.

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::RenderResult;
use crate::pipeline::{encode_jpeg, flatten};
use crate::render::WatermarkRenderer;
use crate::settings::WatermarkSettings;

pub const PREVIEW_WIDTH: u32 = 800;
pub const PREVIEW_HEIGHT: u32 = 400;

/// The unrendered canvas: left half white, right half black.
pub fn preview_canvas() -> DynamicImage {
    let half = PREVIEW_WIDTH / 2;
    let canvas = RgbImage::from_fn(PREVIEW_WIDTH, PREVIEW_HEIGHT, |x, _| {
        if x < half {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    DynamicImage::ImageRgb8(canvas)
}

/// Render `text` onto the preview canvas and return JPEG bytes.
pub fn render_preview(
    renderer: &WatermarkRenderer,
    text: &str,
    settings: &WatermarkSettings,
) -> RenderResult<Vec<u8>> {
    let composition = renderer.compose(&preview_canvas(), text, settings)?;
    encode_jpeg(&flatten(composition.image))
}
