//! morphometry - slope, aspect and curvature classes from a DEM

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use morphokit_core::input::{resolve_input, FALLBACK_NOTICE, USAGE};
use morphokit_core::morphometry::{AspectUnit, SlopeUnit};
use morphokit_core::session::{bootstrap, Platform, ProcessEnv};
use morphokit_core::{ModuleManager, Morphometry, MorphometryOptions, RunObserver, Stage};
use morphokit_saga::DEFAULT_PROGRAM;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "morphometry")]
#[command(author, version, about = "Slope, aspect and curvature classes from a DEM", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// saga_cmd executable
    #[arg(long, env = "SAGA_CMD", default_value = DEFAULT_PROGRAM)]
    saga_cmd: PathBuf,

    /// Curvature method index (0-8), toolkit default when omitted
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=8))]
    method: Option<u8>,

    /// Slope units: radians, degree, percent
    #[arg(long)]
    slope_unit: Option<SlopeUnit>,

    /// Aspect units: radians, degree
    #[arg(long)]
    aspect_unit: Option<AspectUnit>,

    /// Flatness threshold of the curvature classification
    #[arg(long)]
    threshold: Option<f64>,

    /// Input elevation grid; exactly one, otherwise ./test.sgrd is tried
    inputs: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> MorphometryOptions {
        MorphometryOptions {
            method: self.method.map(usize::from),
            slope_unit: self.slope_unit,
            aspect_unit: self.aspect_unit,
            threshold: self.threshold,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging was already initialised");
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner while a module runs, timing log for every stage.
#[derive(Default)]
struct Progress {
    bar: Option<ProgressBar>,
}

impl RunObserver for Progress {
    fn stage_started(&mut self, stage: &Stage) {
        if let Stage::Execute(_) = stage {
            self.bar = Some(spinner(&format!("{}...", stage)));
        }
    }

    fn stage_finished(&mut self, stage: &Stage, elapsed: Duration) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
        debug!("{}: {:.2?}", stage, elapsed);
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<()> {
    let (mut data, mut modules) =
        morphokit_saga::toolkit(&cli.saga_cmd).context("Failed to prepare scratch directory")?;

    println!("morphometry {}", env!("CARGO_PKG_VERSION"));
    if let Some(version) = modules.version() {
        println!("{}", version);
    }
    println!();

    let input = resolve_input(&cli.inputs);
    if input.fallback {
        println!("{}", USAGE);
        println!("{}", FALLBACK_NOTICE);
    }

    bootstrap(&mut modules, Platform::current(), &ProcessEnv)?;

    let mut progress = Progress::default();
    let outputs = Morphometry::new(&mut data, &mut modules)
        .with_options(cli.options())
        .run(&input.dem, &input.output_dir, &mut progress)?;

    for path in outputs.paths() {
        info!("Saved {}", path.display());
    }
    println!("success");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("ERROR: {}", e);
            debug!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
