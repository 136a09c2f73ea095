//! Glacier DEM builder.
//!
//! Prepares the gridded inputs of the ice-flow inversions:
//! - Velocity and velocity-error point lists cropped to the measured region
//! - Bed and surface elevation point lists, downloaded or converted locally
//! - Gap filling of velocity components where configured
//! - Solver input files (`Robin_Beta_<Glacier>.sif`) on request

mod config;
mod pipeline;
mod postprocess;
mod retrieve;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use geodat::GeodatReader;
use ice_common::DemSource;
use sif_template::{SifParameters, DEFAULT_MAX_ITERATIONS, DEFAULT_REGULARIZATION};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::BuilderConfig;
use pipeline::Pipeline;
use retrieve::HttpRetriever;

#[derive(Parser, Debug)]
#[command(name = "dem-builder")]
#[command(about = "Builds velocity and elevation point lists for glacier inversions")]
struct Args {
    /// Bed DEM source: morlighem or cresis
    #[arg(short, long)]
    dem: String,

    /// Builder configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the raw glacier data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving one output directory per glacier
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write solver input files into this directory
    #[arg(long)]
    sif_dir: Option<PathBuf>,

    /// Regularization coefficient for the solver input files
    #[arg(long, default_value_t = DEFAULT_REGULARIZATION)]
    regularization: f64,

    /// Maximum nonlinear iterations for the solver input files
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let source: DemSource = match args.dem.parse() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", Args::command().render_usage());
            std::process::exit(1);
        }
    };

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => BuilderConfig::load(path)?,
        None => BuilderConfig::default(),
    };
    config.apply_env();
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(dir) = args.output_dir.clone() {
        config.output_dir = dir;
    }
    config.validate().context("Invalid builder configuration")?;

    info!(
        source = %source,
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        "Starting DEM builder"
    );

    let pipeline = Pipeline::new(config, source, HttpRetriever::new(), GeodatReader::new());
    let report = pipeline.run().await;

    if let Some(dir) = &args.sif_dir {
        for glacier in pipeline.config().glaciers() {
            let params = SifParameters::new(glacier)
                .with_regularization(args.regularization)
                .with_max_iterations(args.max_iterations);
            params.write(&SifParameters::default_path_in(dir, glacier))?;
        }
    }

    if !report.is_success() {
        for failure in &report.failed {
            error!(
                glacier = %failure.glacier,
                product = %failure.product,
                error = %failure.error,
                "Dataset was not built"
            );
        }
        bail!("{} dataset(s) failed", report.failed.len());
    }

    Ok(())
}
