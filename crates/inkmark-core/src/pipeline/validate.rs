//! Input validation and classification before processing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::RenderError;

/// Lowercase extensions treated as raster images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

/// What an incoming blob should be processed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A single raster image
    Image,
    /// A zip container of files
    Archive,
    /// Neither
    Unsupported,
}

impl InputKind {
    /// Classify a blob from its file name and leading bytes.
    ///
    /// A `.zip` name or a zip signature means archive; image magic bytes or
    /// an image extension mean image.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Self {
        if has_extension(file_name, &["zip"]) || is_zip_header(bytes) {
            InputKind::Archive
        } else if Validator::is_valid_image_header(bytes) || is_image_name(file_name) {
            InputKind::Image
        } else {
            InputKind::Unsupported
        }
    }
}

/// Whether a file name carries one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_name(file_name: &str) -> bool {
    has_extension(file_name, &IMAGE_EXTENSIONS)
}

fn has_extension(file_name: &str, extensions: &[&str]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            extensions.iter().any(|e| *e == ext_lower)
        })
        .unwrap_or(false)
}

/// Zip local-file header (`PK\x03\x04`) or empty-archive record (`PK\x05\x06`).
fn is_zip_header(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && bytes.starts_with(b"PK")
        && matches!((bytes[2], bytes[3]), (3, 4) | (5, 6))
}

/// Validates inputs before processing.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Reject blobs beyond the configured size limit.
    pub fn check_size(&self, bytes: &[u8]) -> Result<(), RenderError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(RenderError::InputTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Check if the leading bytes match a supported raster format.
    pub fn is_valid_image_header(header: &[u8]) -> bool {
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
            return true;
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            return header.len() >= 12 && &header[8..12] == b"WEBP";
        }

        // BMP: BM
        if header[0] == b'B' && header[1] == b'M' {
            return true;
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        let is_tiff_le =
            header[0] == b'I' && header[1] == b'I' && header[2] == 0x2A && header[3] == 0x00;
        let is_tiff_be =
            header[0] == b'M' && header[1] == b'M' && header[2] == 0x00 && header[3] == 0x2A;
        is_tiff_le || is_tiff_be
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_riff_without_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_tiff() {
        assert!(Validator::is_valid_image_header(&[b'I', b'I', 0x2A, 0x00]));
        assert!(Validator::is_valid_image_header(&[b'M', b'M', 0x00, 0x2A]));
        assert!(!Validator::is_valid_image_header(&[b'I', b'I', 0x00, 0x00]));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert!(!Validator::is_valid_image_header(&[0, 0, 0, 0, 0, 0]));
        assert!(!Validator::is_valid_image_header(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_detect_archive_by_name_and_signature() {
        assert_eq!(InputKind::detect("photos.ZIP", b""), InputKind::Archive);
        assert_eq!(
            InputKind::detect("upload.bin", b"PK\x03\x04rest"),
            InputKind::Archive
        );
        assert_eq!(
            InputKind::detect("empty", b"PK\x05\x06\0\0"),
            InputKind::Archive
        );
    }

    #[test]
    fn test_detect_image_by_signature_and_name() {
        assert_eq!(
            InputKind::detect("photo", &[0x89, b'P', b'N', b'G']),
            InputKind::Image
        );
        assert_eq!(InputKind::detect("scan.TIFF", b"????"), InputKind::Image);
    }

    #[test]
    fn test_detect_unsupported() {
        assert_eq!(InputKind::detect("notes.txt", b"hello"), InputKind::Unsupported);
    }

    #[test]
    fn test_is_image_name_case_insensitive() {
        for name in ["a.jpg", "a.JPEG", "b.Png", "c.bmp", "d.webp", "e.tiff"] {
            assert!(is_image_name(name), "{name}");
        }
        assert!(!is_image_name("a.gif"));
        assert!(!is_image_name("a.tif"));
        assert!(!is_image_name("jpg"));
    }

    #[test]
    fn test_check_size() {
        let validator = Validator::new(LimitsConfig {
            max_file_size_mb: 1,
            ..Default::default()
        });
        assert!(validator.check_size(&[0u8; 1024]).is_ok());
        let big = vec![0u8; 1024 * 1024 + 1];
        assert!(matches!(
            validator.check_size(&big),
            Err(RenderError::InputTooLarge { max_mb: 1, .. })
        ));
    }
}
