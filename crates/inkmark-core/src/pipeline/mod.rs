//! Byte-level stages around the renderer.
//!
//! - **validate**: size limits and image/archive detection
//! - **decode**: load images from bytes with limits
//! - **encode**: flatten and encode the rendered result

pub mod decode;
pub mod encode;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::{encode_jpeg, flatten, JPEG_QUALITY};
pub use validate::{is_image_name, InputKind, Validator, IMAGE_EXTENSIONS};
