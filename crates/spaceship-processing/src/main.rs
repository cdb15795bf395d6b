//! CLI entry point for the passenger feature pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use spaceship_processing::{Preprocessor, PreprocessorConfig, ProcessedFrame, io};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Leak-free feature pipeline for spaceship passenger records",
    long_about = "Fits preprocessing parameters on a training table and replays them on later tables.\n\n\
                  EXAMPLES:\n  \
                  # Learn parameters and write training features\n  \
                  spaceship-processing fit -i train.csv -p params.json -o train_features.csv\n\n  \
                  # Apply saved parameters to a test table\n  \
                  spaceship-processing transform -i test.csv -p params.json -o test_features.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit on a labelled table and save the learned parameters
    Fit {
        /// Training CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the fitted parameters (JSON)
        #[arg(short, long)]
        params: PathBuf,

        /// Optional CSV for the transformed training features
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label column name
        #[arg(short, long, default_value = "Transported")]
        target: String,

        /// Number of quantile bins for expenses and age
        #[arg(long, default_value = "10")]
        bins: usize,
    },

    /// Transform a table with previously saved parameters
    Transform {
        /// CSV to transform
        #[arg(short, long)]
        input: PathBuf,

        /// Fitted parameters written by `fit`
        #[arg(short, long)]
        params: PathBuf,

        /// Where to write the transformed features
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    match args.command {
        Command::Fit {
            input,
            params,
            output,
            target,
            bins,
        } => {
            let config = PreprocessorConfig::builder()
                .target_column(target)
                .n_quantile_bins(bins)
                .build()?;
            run_fit(&input, &params, output.as_deref(), config)
        }
        Command::Transform {
            input,
            params,
            output,
        } => run_transform(&input, &params, &output),
    }
}

fn run_fit(
    input: &Path,
    params: &Path,
    output: Option<&Path>,
    config: PreprocessorConfig,
) -> Result<()> {
    ensure_exists(input)?;
    let data = io::load_csv(input)?;

    let mut preprocessor = Preprocessor::with_config(config);
    let processed = preprocessor.fit_transform(&data)?;
    if processed.labels.is_none() {
        warn!(
            "No '{}' column in {}; features written without labels",
            preprocessor.config().target_column,
            input.display()
        );
    }

    preprocessor.save(params)?;
    if let Some(output) = output {
        write_features(processed, output)?;
    }
    Ok(())
}

fn run_transform(input: &Path, params: &Path, output: &Path) -> Result<()> {
    ensure_exists(input)?;
    ensure_exists(params)?;

    let preprocessor = Preprocessor::load(params)?;
    if !preprocessor.is_fitted() {
        return Err(anyhow!("{} holds an unfit preprocessor", params.display()));
    }

    let data = io::load_csv(input)?;
    let processed = preprocessor.transform(&data)?;
    write_features(processed, output)
}

/// Write features, with the label column appended when the input had one.
fn write_features(processed: ProcessedFrame, output: &Path) -> Result<()> {
    let mut frame = processed.features;
    if let Some(labels) = processed.labels {
        frame.with_column(labels)?;
    }

    io::write_csv(&mut frame, output)?;
    info!(
        "Wrote {} rows x {} columns to {}",
        frame.height(),
        frame.width(),
        output.display()
    );
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(anyhow!("File not found: {}", path.display()))
    }
}
