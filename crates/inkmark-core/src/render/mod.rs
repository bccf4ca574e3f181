//! Watermark rendering.
//!
//! - **luminance**: pick a contrasting text color from image brightness
//! - **font**: font loading and the font-size search
//! - **builtin**: bitmap fallback face used when no font file fits
//! - **overlay**: coverage masks, stroke dilation and alpha compositing
//! - **renderer**: the full upsample → layout → paint → encode pass

pub mod builtin;
pub mod font;
pub mod luminance;
pub mod overlay;
pub mod renderer;

pub use font::{FittedFace, FontCatalog, GlyphFitter, LoadedFont, TextBox, MIN_FONT_SIZE, SIZE_STEP};
pub use luminance::{LumaClass, LuminanceClassifier, LUMA_THRESHOLD};
pub use overlay::TextMask;
pub use renderer::{
    anchor_bottom_right, target_dimension, Composition, StrokeStyle, WatermarkLayout,
    WatermarkRenderer, MARGIN_FRACTION, UPSCALE_FACTOR,
};
