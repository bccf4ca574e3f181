//! The `inkmark render` command for watermarking an image or an archive.

use clap::Args;
use inkmark_core::{Config, Inkmark, InputKind};
use std::path::{Path, PathBuf};

use super::WatermarkArgs;

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Image or zip archive to watermark
    #[arg(required = true)]
    pub input: PathBuf,

    /// Watermark text
    #[arg(short, long)]
    pub text: String,

    /// Output file (defaults to watermarked_<name> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub watermark: WatermarkArgs,
}

/// Execute the render command.
pub async fn execute(args: RenderArgs, config: Config) -> anyhow::Result<()> {
    let input = expand(&args.input);
    if !input.is_file() {
        anyhow::bail!("Input not found: {}", input.display());
    }
    if args.text.trim().is_empty() {
        anyhow::bail!("Watermark text is empty");
    }

    let settings = args.watermark.apply(config.watermark)?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = std::fs::read(&input)?;

    let inkmark = Inkmark::new(config).await?;
    let artifact = inkmark
        .process(&file_name, bytes, &args.text, &settings)
        .await?;

    let output = match &args.output {
        Some(path) => expand(path),
        None => default_output(&input, &artifact.file_name),
    };
    std::fs::write(&output, &artifact.bytes)?;

    match (artifact.kind, &artifact.report) {
        (InputKind::Archive, Some(report)) => {
            if report.is_clean() {
                tracing::info!(
                    "Processed {} image(s) into {}",
                    report.processed,
                    output.display()
                );
            } else {
                tracing::warn!(
                    "Completed with {} item(s) copied unprocessed: {:?}",
                    report.fallback,
                    report.fallback_entries
                );
            }
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        _ => {
            tracing::info!("Watermarked image written to {}", output.display());
        }
    }

    Ok(())
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// `watermarked_<name>` in the input's directory.
fn default_output(input: &Path, output_name: &str) -> PathBuf {
    input.with_file_name(output_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("/photos/cat.png"), "watermarked_cat.png"),
            PathBuf::from("/photos/watermarked_cat.png")
        );
        assert_eq!(
            default_output(Path::new("batch.zip"), "watermarked_batch.zip"),
            PathBuf::from("watermarked_batch.zip")
        );
    }

    #[test]
    fn test_expand_leaves_plain_paths() {
        assert_eq!(expand(Path::new("a/b.jpg")), PathBuf::from("a/b.jpg"));
        assert!(!expand(Path::new("~/x.jpg"))
            .to_string_lossy()
            .starts_with('~'));
    }

    #[tokio::test]
    async fn test_execute_writes_watermarked_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tiny.png");
        image::RgbImage::from_pixel(6, 4, image::Rgb([30, 60, 90]))
            .save(&input)
            .unwrap();

        let mut config = Config::default();
        config.fonts.candidates.clear();
        let args = RenderArgs {
            input: input.clone(),
            text: "hi".to_string(),
            output: None,
            watermark: WatermarkArgs::default(),
        };
        execute(args, config).await.unwrap();

        let written = dir.path().join("watermarked_tiny.png");
        // JPEG content under the original extension.
        let decoded = image::load_from_memory(&std::fs::read(&written).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 8));
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_input() {
        let args = RenderArgs {
            input: PathBuf::from("/nonexistent/input.png"),
            text: "hi".to_string(),
            output: None,
            watermark: WatermarkArgs::default(),
        };
        assert!(execute(args, Config::default()).await.is_err());
    }
}
