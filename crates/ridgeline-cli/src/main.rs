// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ridgeline — fingerprint image-processing engine.
//
// Entry point. Initialises logging, parses the command line, and dispatches
// to the engine crates.

use clap::{Parser, Subcommand};
use image::DynamicImage;

use ridgeline_core::error::Result;
use ridgeline_core::human_errors::humanize_error;
use ridgeline_core::{EngineConfig, MinutiaKind};
use ridgeline_imaging::{engine_version, ScanImage};
use ridgeline_minutiae::{FingerprintTemplate, MinutiaeExtractor};

#[derive(Debug, Parser)]
#[command(name = "ridgeline", version, about = "Fingerprint enhancement and minutiae extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report the engine and backend version.
    Version,

    /// Convert a scan to single-channel grayscale.
    Grayscale {
        input: std::path::PathBuf,
        output: std::path::PathBuf,
    },

    /// Resize a scan to exact dimensions.
    Resize {
        input: std::path::PathBuf,
        output: std::path::PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Interpolation code: 0 nearest, 1 linear, 2 cubic, 3 area, 4 lanczos.
        #[arg(long, default_value_t = 1)]
        mode: i32,
    },

    /// Run the full minutiae extraction pipeline and write the annotated
    /// overlay.
    Extract {
        input: std::path::PathBuf,
        output: std::path::PathBuf,
        /// Also encode and save a fingerprint template (JSON).
        #[arg(long)]
        template: Option<std::path::PathBuf>,
        /// Engine configuration file (JSON); defaults apply when omitted.
        #[arg(long)]
        config: Option<std::path::PathBuf>,
        /// Print the structured outcome as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Verify the integrity digest of a stored template.
    Verify { template: std::path::PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        let human = humanize_error(&err);
        eprintln!("error: {}", human.message);
        eprintln!("  {}", human.suggestion);
        tracing::debug!(error = %err, "command failed");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Version => {
            println!("{}", engine_version());
            Ok(())
        }

        Command::Grayscale { input, output } => {
            ScanImage::open(&input)?.grayscale().save(&output)?;
            println!("wrote {}", output.display());
            Ok(())
        }

        Command::Resize {
            input,
            output,
            width,
            height,
            mode,
        } => {
            ScanImage::open(&input)?
                .resize_code(width, height, mode)?
                .save(&output)?;
            println!("wrote {}x{} {}", width, height, output.display());
            Ok(())
        }

        Command::Extract {
            input,
            output,
            template,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => EngineConfig::load(path)?,
                None => EngineConfig::default(),
            };
            let grid = config.template_grid;

            let scan = ScanImage::open(&input)?;
            let extractor = MinutiaeExtractor::new(config);
            let extraction = extractor.extract(scan.as_dynamic())?;

            ScanImage::from_dynamic(DynamicImage::ImageRgb8(extraction.overlay))
                .save(&output)?;

            let outcome = &extraction.outcome;
            if json {
                println!("{}", serde_json::to_string_pretty(outcome)?);
            } else {
                println!(
                    "scan {}: {} ridge endings, {} bifurcations ({} skeleton pixels)",
                    outcome.scan,
                    outcome.count(MinutiaKind::RidgeEnding),
                    outcome.count(MinutiaKind::Bifurcation),
                    outcome.skeleton_pixels
                );
                println!("wrote {}", output.display());
            }

            if let Some(path) = template {
                let encoded = FingerprintTemplate::from_outcome(outcome, grid)?;
                encoded.save(&path)?;
                println!(
                    "template {} ({} occupied cells) -> {}",
                    encoded.id,
                    encoded.occupancy(),
                    path.display()
                );
            }
            Ok(())
        }

        Command::Verify { template } => {
            let loaded = FingerprintTemplate::load(&template)?;
            println!(
                "template {} ok: {} minutiae on a {}x{} grid",
                loaded.id, loaded.minutiae_count, loaded.grid, loaded.grid
            );
            Ok(())
        }
    }
}
