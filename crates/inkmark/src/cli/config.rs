//! The `inkmark config` command for configuration management.

use clap::{Args, Subcommand};
use inkmark_core::render::LoadedFont;
use inkmark_core::{Config, WatermarkSettings};
use std::fmt;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show {
        /// Only print the watermark defaults used when no flags are given
        #[arg(long)]
        watermark: bool,
    },

    /// Show config file path
    Path,

    /// List font candidates in priority order and whether each one loads
    Fonts,

    /// Write a config file with the defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// How a `[fonts]` candidate resolved on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStatus {
    /// First candidate that parses; used for rendering
    Primary,
    /// Parses, but only consulted when earlier fonts cannot fit the text
    Fallback,
    Missing,
    /// Exists but is not a usable TrueType/OpenType file
    Unreadable,
}

impl fmt::Display for FontStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FontStatus::Primary => "primary",
            FontStatus::Fallback => "fallback",
            FontStatus::Missing => "missing",
            FontStatus::Unreadable => "unreadable",
        };
        f.write_str(label)
    }
}

/// Execute the config command against the configuration `main` loaded.
pub async fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { watermark } => {
            if watermark {
                println!("{}", describe_watermark(&config.watermark));
            } else {
                let path = Config::default_path();
                let origin = if path.exists() { "" } else { " (not found, defaults)" };
                println!("# {}{}", path.display(), origin);
                println!("{}", config.to_toml()?);
            }
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Fonts => {
            let statuses = font_statuses(&config.fonts.resolved_candidates());
            for (path, status) in &statuses {
                println!("{:<10} {}", status.to_string(), path.display());
            }
            if !statuses.iter().any(|(_, s)| *s == FontStatus::Primary) {
                println!("No usable font; text renders in the built-in 8px face.");
            }
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Status of each candidate, in the order the renderer tries them.
fn font_statuses(candidates: &[PathBuf]) -> Vec<(PathBuf, FontStatus)> {
    let mut primary_seen = false;
    candidates
        .iter()
        .map(|path| {
            let status = font_status(path, primary_seen);
            if status == FontStatus::Primary {
                primary_seen = true;
            }
            (path.clone(), status)
        })
        .collect()
}

fn font_status(path: &Path, primary_seen: bool) -> FontStatus {
    if !path.exists() {
        FontStatus::Missing
    } else if LoadedFont::from_path(path).is_none() {
        FontStatus::Unreadable
    } else if primary_seen {
        FontStatus::Fallback
    } else {
        FontStatus::Primary
    }
}

fn describe_watermark(settings: &WatermarkSettings) -> String {
    let color = if settings.auto_color {
        format!("auto (else {})", settings.color)
    } else {
        settings.color.to_string()
    };
    let stroke = if settings.stroke_enabled {
        format!("{}px", settings.stroke_width)
    } else {
        "off".to_string()
    };
    format!(
        "size     {:.0}% of the shorter side\n\
         color    {}\n\
         opacity  {} ({}%)\n\
         stroke   {}",
        settings.size_percent * 100.0,
        color,
        settings.opacity,
        settings.opacity_percent(),
        stroke
    )
}
