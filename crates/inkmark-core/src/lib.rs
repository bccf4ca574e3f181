//! Inkmark Core - Embeddable watermark rendering library.
//!
//! Inkmark burns a text watermark into raster images, one at a time or in
//! bulk through zip archives, and hands back self-contained output bytes.
//!
//! # Architecture
//!
//! The engine holds no state between calls:
//!
//! ```text
//! Image → Decode → Upsample 2× → Fit font → Paint stroke/fill → Composite → JPEG
//! Zip   → Extract → Walk tree → (render | copy)* → Repackage → Zip
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use inkmark_core::{Config, Inkmark, WatermarkSettings};
//!
//! #[tokio::main]
//! async fn main() -> inkmark_core::Result<()> {
//!     let inkmark = Inkmark::new(Config::load()?).await?;
//!
//!     let bytes = std::fs::read("photo.png")?;
//!     let jpeg = inkmark
//!         .render_image(bytes, "© studio", &WatermarkSettings::default())
//!         .await?;
//!     std::fs::write("watermarked_photo.png", jpeg)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod archive;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod profile;
pub mod render;
pub mod settings;
pub mod types;

// Re-exports for convenient access
pub use archive::ArchiveProcessor;
pub use config::Config;
pub use error::{ArchiveError, ConfigError, InkmarkError, RenderError, RenderResult, Result};
pub use pipeline::InputKind;
pub use profile::{load_profiles, save_profiles, WatermarkProfile};
pub use render::{FontCatalog, WatermarkLayout, WatermarkRenderer};
pub use settings::{Rgb, WatermarkSettings};
pub use types::{output_name, ArchiveOutput, ArchiveReport, ProcessedArtifact};

use pipeline::Validator;
use std::sync::Arc;
use std::time::Duration;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inkmark engine - the main entry point for watermarking.
///
/// Each call runs the synchronous engine on a blocking worker, bounded by
/// `limits.render_timeout_ms`. Independent calls may run concurrently.
pub struct Inkmark {
    config: Config,
    renderer: WatermarkRenderer,
    validator: Validator,
}

impl Inkmark {
    /// Create an engine, loading the configured font candidates.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Inkmark v{}", VERSION);
        let candidates = config.fonts.resolved_candidates();
        let fonts = tokio::task::spawn_blocking(move || FontCatalog::load(&candidates))
            .await
            .map_err(|e| RenderError::Worker(format!("Font loading failed: {}", e)))?;
        if fonts.is_empty() {
            tracing::warn!("No font candidate could be loaded, text will use the built-in face");
        }
        Ok(Self::with_fonts(config, fonts))
    }

    /// Create an engine with default configuration.
    pub async fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config).await
    }

    /// Create an engine over an already-built font catalog.
    pub fn with_fonts(config: Config, fonts: FontCatalog) -> Self {
        let renderer = WatermarkRenderer::new(Arc::new(fonts), config.limits.clone());
        let validator = Validator::new(config.limits.clone());
        Self {
            config,
            renderer,
            validator,
        }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &WatermarkRenderer {
        &self.renderer
    }

    /// Watermark a single image and return JPEG bytes.
    pub async fn render_image(
        &self,
        bytes: Vec<u8>,
        text: &str,
        settings: &WatermarkSettings,
    ) -> Result<Vec<u8>> {
        settings.validate()?;
        self.validator.check_size(&bytes)?;
        let text = text.to_string();
        let settings = *settings;
        self.run_blocking("render", move |renderer| {
            Ok(renderer.render(&bytes, &text, &settings)?)
        })
        .await
    }

    /// Watermark every image in a zip container.
    pub async fn process_archive(
        &self,
        bytes: Vec<u8>,
        text: &str,
        settings: &WatermarkSettings,
    ) -> Result<ArchiveOutput> {
        settings.validate()?;
        self.validator.check_size(&bytes)?;
        let text = text.to_string();
        let settings = *settings;
        self.run_blocking("archive", move |renderer| {
            Ok(ArchiveProcessor::new(&renderer).process(&bytes, &text, &settings)?)
        })
        .await
    }

    /// Detect whether `bytes` is an image or an archive and process it.
    ///
    /// Inputs that look like neither go down the image path and surface as
    /// decode errors.
    pub async fn process(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        text: &str,
        settings: &WatermarkSettings,
    ) -> Result<ProcessedArtifact> {
        let kind = InputKind::detect(file_name, &bytes);
        tracing::debug!("{} detected as {:?}", file_name, kind);

        let (bytes, report) = match kind {
            InputKind::Archive => {
                let output = self.process_archive(bytes, text, settings).await?;
                (output.bytes, Some(output.report))
            }
            InputKind::Image | InputKind::Unsupported => {
                (self.render_image(bytes, text, settings).await?, None)
            }
        };

        Ok(ProcessedArtifact {
            kind,
            file_name: output_name(file_name),
            bytes,
            report,
        })
    }

    /// Render `text` onto the half-white, half-black preview canvas.
    pub async fn preview(&self, text: &str, settings: &WatermarkSettings) -> Result<Vec<u8>> {
        settings.validate()?;
        let text = text.to_string();
        let settings = *settings;
        self.run_blocking("preview", move |renderer| {
            Ok(preview::render_preview(&renderer, &text, &settings)?)
        })
        .await
    }

    /// Run `job` on a blocking worker with the configured timeout.
    async fn run_blocking<T, F>(&self, stage: &str, job: F) -> Result<T>
    where
        F: FnOnce(WatermarkRenderer) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let renderer = self.renderer.clone();
        let timeout_ms = self.config.limits.render_timeout_ms;

        let outcome = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(move || job(renderer)),
        )
        .await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(RenderError::Worker(format!("Task join error: {}", e)).into()),
            Err(_) => Err(RenderError::Timeout {
                stage: stage.to_string(),
                timeout_ms,
            }
            .into()),
        }
    }
}
