//! Error types for the Inkmark watermark pipeline.
//!
//! Errors are organized by stage. Only two kinds of failure cross the engine
//! boundary during normal operation: a source image that cannot be decoded
//! (or re-encoded) and a container that cannot be opened as an archive.
//! Per-entry failures inside an archive are absorbed by the archive processor
//! and reported through [`crate::ArchiveReport`] instead.

use thiserror::Error;

/// Top-level error type for Inkmark operations.
#[derive(Error, Debug)]
pub enum InkmarkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Single-image rendering errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Archive job errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from rendering a single image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Source bytes could not be parsed as an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Source decoded to an image with a zero dimension
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Source image dimensions exceed the configured limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Input blob exceeds the configured size limit
    #[error("Input too large: {size_mb}MB > {max_mb}MB")]
    InputTooLarge { size_mb: u64, max_mb: u64 },

    /// Re-encoding the composited image failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// The job did not finish within the caller's time bound
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The blocking worker running the job panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Errors that abort a whole archive job.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The input cannot be opened as a zip container
    #[error("Corrupt container: {0}")]
    CorruptContainer(String),

    /// Scratch storage could not be created, read or written
    #[error("Scratch storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the output container failed
    #[error("Failed to repackage archive: {0}")]
    Repackage(String),
}

/// Convenience type alias for Inkmark results.
pub type Result<T> = std::result::Result<T, InkmarkError>;

/// Convenience type alias for render-specific results.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
