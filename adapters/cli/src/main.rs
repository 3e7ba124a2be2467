#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that synthesizes log records at configurable severity proportions.

mod profile;
mod settings;
mod summary;

use std::{
    io,
    path::PathBuf,
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use logmix_core::Severity;
use logmix_generator::{GenerationReport, LogGenerator, RECORD_TARGET};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::{profile::Profile, settings::RunSettings};

/// Exit code reported when the requested mix cannot be generated.
const INVALID_INPUT_EXIT_CODE: u8 = 2;

/// Formatting applied to emitted records and the run summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Synthesizes log records at configurable severity proportions.
///
/// Every level given a percentage is pinned; the remaining share is spread
/// evenly over the other levels, except fatal, which only appears when pinned.
/// Without any level the default mix (error 10, warn 20, info 50, debug 20)
/// is used.
#[derive(Debug, Parser)]
#[command(name = "logmix", version)]
struct Cli {
    /// Percentage of fatal records. Emitting one terminates the run.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    fatal: Option<f64>,
    /// Percentage of error records.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    error: Option<f64>,
    /// Percentage of warn records.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    warn: Option<f64>,
    /// Percentage of info records.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    info: Option<f64>,
    /// Percentage of debug records.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    debug: Option<f64>,
    /// Percentage of trace records.
    #[arg(long, value_name = "PERCENT", value_parser = parse_percent)]
    trace: Option<f64>,
    /// Number of records to draw [default: 1000].
    #[arg(short = 'n', long)]
    count: Option<usize>,
    /// Pause between consecutive records, in milliseconds [default: 0].
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,
    /// Seed for the pseudo-random source [default: derived from the clock].
    #[arg(long)]
    seed: Option<u64>,
    /// Record and summary format [default: text].
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// TOML profile providing defaults for any of the options above.
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,
    /// Print the derived range partition and exit without generating records.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn level_overrides(&self) -> [(Severity, Option<f64>); 6] {
        [
            (Severity::Fatal, self.fatal),
            (Severity::Error, self.error),
            (Severity::Warn, self.warn),
            (Severity::Info, self.info),
            (Severity::Debug, self.debug),
            (Severity::Trace, self.trace),
        ]
    }
}

fn parse_percent(value: &str) -> Result<f64, String> {
    let percent: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if percent.is_finite() {
        Ok(percent)
    } else {
        Err(format!("`{value}` is not a finite number"))
    }
}

/// Entry point for the logmix command-line interface.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(INVALID_INPUT_EXIT_CODE)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let profile = match &cli.profile {
        Some(path) => Profile::from_path(path)?,
        None => Profile::default(),
    };
    let settings = RunSettings::resolve(cli, profile, clock_seed);
    install_subscriber(settings.format)?;

    let mut generator = match LogGenerator::new(settings.pinned, settings.ratios) {
        Ok(generator) => generator,
        Err(errors) => {
            for error in &errors {
                eprintln!("error: {error}");
            }
            return Ok(ExitCode::from(INVALID_INPUT_EXIT_CODE));
        }
    };

    let ranges = match generator.derive_distribution_ranges() {
        Ok(ranges) => ranges,
        Err(error) => {
            eprintln!("error: {error}");
            return Ok(ExitCode::from(INVALID_INPUT_EXIT_CODE));
        }
    };

    if settings.dry_run {
        println!("{}", summary::render_ranges(&ranges, settings.format)?);
        return Ok(ExitCode::SUCCESS);
    }

    let pinned: Vec<Severity> = generator.pinned().iter().collect();
    tracing::debug!(
        seed = settings.seed,
        count = settings.count,
        ?pinned,
        "generating records"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let counts = generator.output(&ranges, settings.count, settings.delay, &mut rng);
    let report = GenerationReport::new(ranges, counts);

    eprintln!(
        "{}",
        summary::render_report(&report, settings.seed, settings.format)?
    );
    Ok(ExitCode::SUCCESS)
}

/// Routes records to stdout at every level unless `RUST_LOG` says otherwise.
fn install_subscriber(format: OutputFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{RECORD_TARGET}=trace")));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout);

    match format {
        OutputFormat::Text => builder.try_init(),
        OutputFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
