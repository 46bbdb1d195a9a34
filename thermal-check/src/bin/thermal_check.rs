//! ACIS focal-plane load review
//!
//! Segments a commanded-state stream into observations, looks up their
//! catalog data, and checks a predicted focal-plane temperature against the
//! planning and per-category limits.
//!
//! # Outputs
//! - `report.json`: classified observations and violations of every limit
//! - `violations.csv`: one row per violation
//! - `validation.csv`: residual quantiles outside their limits (with `--validation`)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use acis_obs::time_utils::{parse_time, secs_to_date};
use acis_obs::{review_load, validation_violations, ThermalCheckConfig};
use thermal_check::args::{CatalogArgs, LimitArgs};
use thermal_check::input::{read_states, read_temperatures, read_validation};
use thermal_check::report::{format_summary, write_outputs};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ACIS focal-plane thermal load review",
    long_about = "Finds the science observations in a commanded-state stream, sorts them by \n\
        the focal-plane limit that applies, and reports where a predicted FPTEMP \n\
        trace exceeds those limits."
)]
struct Args {
    /// Commanded states (.json array or .csv with a header row)
    #[arg(long)]
    states: PathBuf,

    /// Predicted focal-plane temperature CSV with columns time,value
    #[arg(long)]
    temperatures: PathBuf,

    /// Load start, as mission seconds or YYYY:DDD:hh:mm:ss.sss
    #[arg(long)]
    load_start: String,

    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model/telemetry CSV (msid,time,model,telemetry[,good]) for validation
    #[arg(long)]
    validation: Option<PathBuf>,

    #[command(flatten)]
    limits: LimitArgs,

    #[command(flatten)]
    catalog: CatalogArgs,

    /// Write the effective configuration to this file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => ThermalCheckConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}"))?,
        None => ThermalCheckConfig::default(),
    };
    args.limits.apply(&mut config);
    args.catalog.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if let Some(path) = &args.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to save config to {path:?}"))?;
        log::info!("Saved configuration to {path:?}");
    }

    let load_start = parse_time(&args.load_start)
        .with_context(|| format!("Invalid load start {:?}", args.load_start))?;
    log::info!("Load start: {} ({load_start})", secs_to_date(load_start)?);

    let states = read_states(&args.states)
        .with_context(|| format!("Failed to read states from {:?}", args.states))?;
    let series = read_temperatures(&args.temperatures)
        .with_context(|| format!("Failed to read temperatures from {:?}", args.temperatures))?;

    let lookup = args.catalog.lookup(&config)?;
    let report = review_load(&states, &series, load_start, &config.limits, lookup.as_ref())
        .context("Load review failed")?;

    let validation = match &args.validation {
        Some(path) => {
            let residuals = read_validation(path)
                .with_context(|| format!("Failed to read validation data from {path:?}"))?;
            validation_violations(&residuals, &config.validation_limits)
        }
        None => Vec::new(),
    };

    print!("{}", format_summary(&report, &validation));

    let written = write_outputs(&report, &validation, &args.output_dir)
        .with_context(|| format!("Failed to write outputs to {:?}", args.output_dir))?;
    println!("\n=== Output Files ===");
    for path in written {
        println!("{path:?}");
    }

    Ok(())
}
