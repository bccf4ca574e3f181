//! The `inkmark preview` command.

use clap::Args;
use inkmark_core::{Config, Inkmark};
use std::path::PathBuf;

use super::WatermarkArgs;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Watermark text
    #[arg(short, long)]
    pub text: String,

    /// Output JPEG
    #[arg(short, long, default_value = "watermark_preview.jpg")]
    pub output: PathBuf,

    #[command(flatten)]
    pub watermark: WatermarkArgs,
}

/// Execute the preview command.
pub async fn execute(args: PreviewArgs, config: Config) -> anyhow::Result<()> {
    if args.text.trim().is_empty() {
        anyhow::bail!("Watermark text is empty");
    }
    let settings = args.watermark.apply(config.watermark)?;
    tracing::debug!(?settings, "Rendering preview");

    let inkmark = Inkmark::new(config).await?;
    let jpeg = inkmark.preview(&args.text, &settings).await?;

    let output = PathBuf::from(shellexpand::tilde(&args.output.to_string_lossy()).into_owned());
    std::fs::write(&output, jpeg)?;

    let color = if settings.auto_color {
        "auto".to_string()
    } else {
        settings.color.to_string()
    };
    let stroke = if settings.stroke_enabled {
        format!("{}px", settings.stroke_width)
    } else {
        "off".to_string()
    };
    println!(
        "Preview written to {} (size {:.0}%, color {}, opacity {}%, stroke {})",
        output.display(),
        settings.size_percent * 100.0,
        color,
        settings.opacity_percent(),
        stroke
    );
    Ok(())
}
