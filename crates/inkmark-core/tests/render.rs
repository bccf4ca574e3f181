//! End-to-end rendering through the public API.

use image::{DynamicImage, GenericImageView, Rgb as Pixel, RgbImage};
use inkmark_core::config::LimitsConfig;
use inkmark_core::render::{target_dimension, LuminanceClassifier};
use inkmark_core::{
    Config, FontCatalog, Inkmark, InkmarkError, RenderError, Rgb, WatermarkRenderer,
    WatermarkSettings,
};
use std::io::Cursor;
use std::sync::Arc;

fn encode(img: &RgbImage, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn builtin_renderer() -> WatermarkRenderer {
    WatermarkRenderer::new(Arc::new(FontCatalog::empty()), LimitsConfig::default())
}

fn system_renderer() -> Option<WatermarkRenderer> {
    let fonts = FontCatalog::load(&Config::default().fonts.resolved_candidates());
    if fonts.is_empty() {
        eprintln!("No system font candidate found, skipping outline-font checks");
        return None;
    }
    Some(WatermarkRenderer::new(
        Arc::new(fonts),
        LimitsConfig::default(),
    ))
}

fn mean_green(img: &image::RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0.0;
    for y in ys {
        for x in xs.clone() {
            sum += img.get_pixel(x, y)[1] as f64;
            n += 1.0;
        }
    }
    sum / n
}

#[test]
fn red_square_gets_mark_in_bottom_right_quadrant() {
    let source = RgbImage::from_pixel(10, 10, Pixel([255, 0, 0]));
    let jpeg = builtin_renderer()
        .render(
            &encode(&source, image::ImageFormat::Png),
            "X",
            &WatermarkSettings::default(),
        )
        .unwrap();

    let out = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (20, 20));

    // Away from the mark the image stays red.
    for y in 0..8 {
        for x in 0..8 {
            let p = out.get_pixel(x, y);
            assert!(p[0] > 200 && p[1] < 70 && p[2] < 70, "({x},{y}) = {p:?}");
        }
    }

    let marked = mean_green(&out, 10..20, 10..20);
    let top_left = mean_green(&out, 0..10, 0..10);
    let top_right = mean_green(&out, 10..20, 0..10);
    let bottom_left = mean_green(&out, 0..10, 10..20);
    assert!(marked > top_left + 15.0, "{marked} vs {top_left}");
    assert!(marked > top_right + 15.0, "{marked} vs {top_right}");
    assert!(marked > bottom_left + 15.0, "{marked} vs {bottom_left}");
}

#[test]
fn output_is_twice_the_source() {
    let source = RgbImage::from_fn(100, 50, |x, y| Pixel([x as u8, y as u8, 90]));
    let jpeg = builtin_renderer()
        .render(
            &encode(&source, image::ImageFormat::Png),
            "hello",
            &WatermarkSettings::default(),
        )
        .unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (200, 100));
}

#[test]
fn every_supported_source_format_decodes() {
    let source = RgbImage::from_pixel(8, 6, Pixel([10, 200, 30]));
    for format in [
        image::ImageFormat::Png,
        image::ImageFormat::Jpeg,
        image::ImageFormat::Bmp,
        image::ImageFormat::Tiff,
    ] {
        let jpeg = builtin_renderer()
            .render(
                &encode(&source, format),
                "ok",
                &WatermarkSettings::default(),
            )
            .unwrap_or_else(|e| panic!("{format:?}: {e}"));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (16, 12), "{format:?}");
    }
}

#[test]
fn ink_box_respects_target_with_outline_fonts() {
    let Some(renderer) = system_renderer() else {
        return;
    };
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 180, Pixel([90, 90, 90])));

    for text in ["A", "watermark", "© 2024 Studio", "Wide text that needs shrinking"] {
        for size_percent in [0.1, 0.3, 0.55, 1.0] {
            let settings = WatermarkSettings {
                size_percent,
                ..Default::default()
            };
            let layout = renderer.compose(&source, text, &settings).unwrap().layout;
            assert_eq!(layout.target, target_dimension(600, 360, size_percent));
            if !layout.builtin_face {
                assert!(
                    layout.text_width.max(layout.text_height) <= layout.target,
                    "{text:?} at {size_percent}: {}x{} > {}",
                    layout.text_width,
                    layout.text_height,
                    layout.target
                );
                assert!(layout.font_size > 10);
            }
        }
    }
}

#[test]
fn mark_bottom_right_sits_at_margin() {
    let Some(renderer) = system_renderer() else {
        return;
    };
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 200, Pixel([0, 0, 0])));
    let layout = renderer
        .compose(&source, "edge", &WatermarkSettings::default())
        .unwrap()
        .layout;
    // 800x400 upsampled, margins 40 and 20.
    assert_eq!(layout.left + layout.text_width as i64, 800 - 40);
    assert_eq!(layout.top + layout.text_height as i64, 400 - 20);
}

#[test]
fn auto_color_is_pure_function_of_pixels() {
    let a = DynamicImage::ImageRgb8(RgbImage::from_fn(32, 16, |x, _| {
        Pixel([(x * 8) as u8, 40, 200])
    }));
    let b = a.clone();
    assert_eq!(
        LuminanceClassifier::classify(&a),
        LuminanceClassifier::classify(&b)
    );

    let settings = WatermarkSettings {
        auto_color: true,
        ..Default::default()
    };
    let renderer = builtin_renderer();
    let first = renderer.compose(&a, "m", &settings).unwrap();
    let second = renderer.compose(&b, "m", &settings).unwrap();
    assert_eq!(first.layout, second.layout);
    assert_eq!(first.image, second.image);
}

#[test]
fn extreme_images_pick_contrasting_foreground() {
    let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Pixel([0, 0, 0])));
    let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Pixel([255, 255, 255])));
    assert_eq!(LuminanceClassifier::classify(&black).foreground, Rgb::WHITE);
    assert_eq!(LuminanceClassifier::classify(&white).foreground, Rgb::BLACK);
}

#[test]
fn stroke_for_white_fill_is_black() {
    let settings = WatermarkSettings {
        stroke_enabled: true,
        ..Default::default()
    };
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Pixel([0, 128, 0])));
    let layout = builtin_renderer()
        .compose(&source, "S", &settings)
        .unwrap()
        .layout;
    assert_eq!(layout.fill, Rgb::WHITE);
    let stroke = layout.stroke.unwrap();
    assert_eq!(stroke.color, Rgb::BLACK);
    assert_eq!(stroke.width, 2);
}

#[test]
fn undecodable_source_is_a_decode_error() {
    let err = builtin_renderer()
        .render(b"\x89PNG but not really", "x", &WatermarkSettings::default())
        .unwrap_err();
    assert!(matches!(err, RenderError::Decode(_)));
}

#[test]
fn oversized_source_rejected_before_upsampling() {
    let renderer = WatermarkRenderer::new(
        Arc::new(FontCatalog::empty()),
        LimitsConfig {
            max_image_dimension: 16,
            ..Default::default()
        },
    );
    let source = RgbImage::from_pixel(17, 4, Pixel([1, 2, 3]));
    let err = renderer
        .render(
            &encode(&source, image::ImageFormat::Png),
            "x",
            &WatermarkSettings::default(),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::ImageTooLarge { .. }));
}

#[tokio::test]
async fn facade_preview_is_1600_by_800() {
    let inkmark = Inkmark::with_fonts(Config::default(), FontCatalog::empty());
    let jpeg = inkmark
        .preview("preview", &WatermarkSettings::default())
        .await
        .unwrap();
    assert_eq!(image::load_from_memory(&jpeg).unwrap().dimensions(), (1600, 800));
}

#[tokio::test]
async fn facade_times_out() {
    let mut config = Config::default();
    config.limits.render_timeout_ms = 0;
    let inkmark = Inkmark::with_fonts(config, FontCatalog::empty());
    let source = RgbImage::from_pixel(2000, 2000, Pixel([5, 5, 5]));
    let result = inkmark
        .render_image(
            encode(&source, image::ImageFormat::Png),
            "slow",
            &WatermarkSettings::default(),
        )
        .await;
    assert!(matches!(
        result,
        Err(InkmarkError::Render(RenderError::Timeout { .. }))
    ));
}
