//! Inkmark CLI - Burn text watermarks into images and zip archives of images.
//!
//! Inkmark upsamples each image 2×, draws the watermark text in the
//! bottom-right corner and writes a JPEG. Zip archives are processed entry by
//! entry with their directory tree preserved.
//!
//! # Usage
//!
//! ```bash
//! # Watermark a single image
//! inkmark render photo.png --text "© Studio"
//!
//! # Watermark every image in an archive
//! inkmark render shoot.zip --text "© Studio" --auto-color --stroke
//!
//! # Preview settings on a half-white, half-black canvas
//! inkmark preview --text "© Studio" -o preview.jpg
//!
//! # View configuration, or just the watermark defaults
//! inkmark config show
//! inkmark config show --watermark
//!
//! # Check which font files will be used
//! inkmark config fonts
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Inkmark - Burn text watermarks into images and zip archives of images.
#[derive(Parser, Debug)]
#[command(name = "inkmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark an image or every image in a zip archive
    Render(cli::render::RenderArgs),

    /// Render the watermark onto a half-white, half-black preview canvas
    Preview(cli::preview::PreviewArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match inkmark_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `inkmark config path`."
            );
            inkmark_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Inkmark v{}", inkmark_core::VERSION);

    match cli.command {
        Commands::Render(args) => cli::render::execute(args, config).await,
        Commands::Preview(args) => cli::preview::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
