use anyhow::{Context, Result};
use barscan::batch::summary_block;
use barscan::config::parse_rotations;
use barscan::utils::grayscale::{gray_stats, to_gray};
use barscan::{BatchOptions, BatchProcessor, ImageAsset, ScanConfig, ScanEngine, ScanError};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barscan", version, about = "Barcode/QR triage for degraded photos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode every image under a directory and write result.txt / results.txt
    Batch {
        dir: PathBuf,
        /// Move decoded files into <DIR>/ok
        #[arg(long)]
        move_ok: bool,
        /// Do not draw the progress line
        #[arg(long)]
        no_progress: bool,
        /// Rotation angles to retry, e.g. "90,180,270"
        #[arg(long)]
        rotations: Option<String>,
        /// Skip the OCR fallback even if tesseract is installed
        #[arg(long)]
        no_ocr: bool,
    },
    /// Run the strategy chain on a single image
    Decode {
        image: PathBuf,
        /// Rotation angles to retry, e.g. "90,180,270"
        #[arg(long)]
        rotations: Option<String>,
        /// Skip the OCR fallback even if tesseract is installed
        #[arg(long)]
        no_ocr: bool,
    },
    /// Print grayscale stats and the detected crop region of an image
    Crop { image: PathBuf },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Batch {
            dir,
            move_ok,
            no_progress,
            rotations,
            no_ocr,
        } => {
            let options = BatchOptions {
                move_on_success: move_ok,
                show_progress: !no_progress,
            };
            batch_cmd(&dir, options, rotations.as_deref(), no_ocr)
        }
        Command::Decode {
            image,
            rotations,
            no_ocr,
        } => decode_cmd(&image, rotations.as_deref(), no_ocr),
        Command::Crop { image } => crop_cmd(&image),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let default = if std::env::var_os("BARSCAN_DEBUG").is_some() {
        "barscan=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_engine(rotations: Option<&str>, no_ocr: bool) -> Result<ScanEngine> {
    let mut config = ScanConfig::from_env();
    if let Some(rotations) = rotations {
        config.rotations = parse_rotations(rotations)?;
    }
    config.validate()?;

    let engine = ScanEngine::with_defaults(config);
    Ok(if no_ocr { engine.without_ocr() } else { engine })
}

fn batch_cmd(dir: &Path, options: BatchOptions, rotations: Option<&str>, no_ocr: bool) -> Result<()> {
    let engine = build_engine(rotations, no_ocr)?;
    let summary = match BatchProcessor::new(&engine, options).run(dir) {
        Ok(summary) => summary,
        Err(ScanError::NoImages(root)) => {
            println!("no image files found in {}", root.display());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    print!("{}", summary_block(&summary));
    if options.move_on_success {
        println!("Moved to ok/: {}", summary.moved);
        if summary.move_failures > 0 {
            println!("Could not move: {}", summary.move_failures);
        }
    }
    println!("Detailed log: {}", summary.result_log.display());
    println!("Summary report: {}", summary.summary_report.display());
    Ok(())
}

fn decode_cmd(image: &Path, rotations: Option<&str>, no_ocr: bool) -> Result<()> {
    let engine = build_engine(rotations, no_ocr)?;
    let result = engine.scan_path(image)?;

    println!("Image: {}", image.display());
    match result.method() {
        Some(method) => {
            println!("Found {} code(s)", result.codes().len());
            for (i, code) in result.codes().iter().enumerate() {
                println!("  {}: {}", i, code);
            }
            println!("Method: {} (strategy: {})", method, method.strategy);
        }
        None => println!("Status: {}", result.status()),
    }
    println!("Attempted: {}", result.attempted().join(", "));
    Ok(())
}

fn crop_cmd(image: &Path) -> Result<()> {
    let config = ScanConfig::from_env();
    let asset = ImageAsset::load(image, config.max_dimension)
        .with_context(|| format!("loading {}", image.display()))?;
    let gray = to_gray(asset.image());
    let stats = gray_stats(&gray);

    println!("Image: {} ({}x{})", image.display(), gray.width(), gray.height());
    println!("Gray stats: min={} max={} avg={}", stats.min, stats.max, stats.avg);
    match barscan::preprocess::detect_crop_region(asset.image(), &config.crop) {
        Some(region) => println!(
            "Crop region: x={} y={} w={} h={}",
            region.x, region.y, region.width, region.height
        ),
        None => println!("Crop region: none"),
    }
    Ok(())
}
