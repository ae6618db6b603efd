use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use photoalign::{io, AlignParams, Aligner};

/// Align handheld photos to the first one and crop all of them to their
/// common overlap.
#[derive(Parser, Debug)]
#[command(name = "photoalign", version, about)]
struct Cli {
    /// Input images; the first file is the reference frame.
    #[arg(required = true, num_args = 2..)]
    files: Vec<PathBuf>,

    /// Upper bound on detected features per image.
    #[arg(short = 'n', long, default_value_t = 4000)]
    max_features: usize,

    /// Erosion radius (pixels) shrinking the common overlap.
    #[arg(long, default_value_t = 4)]
    erode: usize,

    /// Lowe ratio for match filtering.
    #[arg(long, default_value_t = 0.75)]
    ratio: f32,

    /// RANSAC seed, for reproducible runs.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Skip images that fail to align instead of aborting.
    #[arg(long)]
    skip_failed: bool,

    /// Also write the uncropped warped images (aligned_NNN.png).
    #[arg(long)]
    keep_uncropped: bool,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = photoalign::core::init_with_level(level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(err.as_ref());
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = AlignParams::default();
    params.features.max_features = cli.max_features;
    params.matching.ratio = cli.ratio;
    params.ransac.seed = cli.seed;
    params.erode = cli.erode;
    params.skip_failed = cli.skip_failed;
    params.keep_uncropped = cli.keep_uncropped;

    let mut images = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        log::debug!("loading {}", path.display());
        let img =
            io::load_rgb(path).map_err(|err| format!("{}: {err}", path.display()))?;
        images.push(img);
    }

    let result = Aligner::new(params).align(&images)?;
    if !result.skipped.is_empty() {
        log::warn!("skipped inputs (by position): {:?}", result.skipped);
    }

    std::fs::create_dir_all(&cli.out_dir)?;
    for (i, img) in result.images.iter().enumerate() {
        let path = cli.out_dir.join(format!("aligned_cropped_{:03}.png", i + 1));
        io::save_rgb(&path, img)?;
        log::info!("saved {}", path.display());
    }
    if cli.keep_uncropped {
        for (i, img) in result.warped.iter().enumerate() {
            let path = cli.out_dir.join(format!("aligned_{:03}.png", i + 1));
            io::save_rgb(&path, img)?;
            log::info!("saved {}", path.display());
        }
    }
    let overlay_path = cli.out_dir.join("ref_matches_all.png");
    io::save_rgb(&overlay_path, &result.overlay)?;
    log::info!("saved {}", overlay_path.display());

    Ok(())
}
