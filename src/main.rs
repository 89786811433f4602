//! Brain Network Features - CLI
//!
//! Extracts graph features from regional signal time series and writes them
//! as a JSON feature dictionary.

use anyhow::{bail, Context, Result};
use brain_network_features::error::FeatureError;
use brain_network_features::graph::{ExtractionConfig, FeatureEngine, FeatureMap, GraphFeatureEngine};
use brain_network_features::timeseries::{self, TimeSeries};
use brain_network_features::Config;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "brain-features")]
#[command(about = "Graph features from brain-signal correlations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ExtractArgs {
    /// Time-series file to read
    #[arg(short, long)]
    time_series_file: PathBuf,

    /// Where to write the JSON features (stdout when omitted)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Also emit pairwise region correlations as features
    #[arg(long)]
    get_correlations: bool,

    /// YAML config file (default: brain-features.yaml in CWD)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the Sigma/Omega reference graphs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// ICA export (rows = time points, columns = ICA regions): variances and
    /// graph features over the valid ICA regions
    Ica {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// Any delimited time series (rows = time points): unlabelled graph features
    Graph {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// Atlas time series (rows = labelled regions): variances, optionally
    /// graph features over every region
    Atlas {
        #[command(flatten)]
        args: ExtractArgs,

        /// Compute graph features in addition to signal variances
        #[arg(long)]
        network_features: bool,
    },
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so JSON on stdout stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,brain_network_features=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ica { args } => run_extraction(&args, |series, config, engine| {
            timeseries::ica_graph_features(&TimeSeries::parse_columns(series)?, config, engine)
        }),
        Commands::Graph { args } => run_extraction(&args, |series, config, engine| {
            timeseries::time_series_graph_features(
                &TimeSeries::parse_columns(series)?,
                config,
                engine,
            )
        }),
        Commands::Atlas {
            args,
            network_features,
        } => run_extraction(&args, |series, config, engine| {
            timeseries::atlas_time_series_features(
                &TimeSeries::parse_labelled(series)?,
                config,
                network_features,
                engine,
            )
        }),
    }
}

fn run_extraction<F>(args: &ExtractArgs, extract: F) -> Result<()>
where
    F: FnOnce(&str, &ExtractionConfig, &dyn FeatureEngine) -> Result<FeatureMap, FeatureError>,
{
    if !args.time_series_file.exists() {
        bail!(
            "time series file not found: {}",
            args.time_series_file.display()
        );
    }

    // Load configuration, CLI flags win
    let mut config = Config::from_yaml_and_env(args.config.as_deref())?;
    if args.get_correlations {
        config.extraction.add_correlation_features = true;
    }
    if let Some(seed) = args.seed {
        config.extraction.small_world.seed = Some(seed);
    }

    tracing::info!(
        "Extracting features from {} at thresholds {:?}",
        args.time_series_file.display(),
        config.extraction.thresholds
    );

    let text = std::fs::read_to_string(&args.time_series_file)
        .with_context(|| format!("reading {}", args.time_series_file.display()))?;
    let engine = GraphFeatureEngine::from_config(&config.extraction);

    let features = extract(&text, &config.extraction, &engine).map_err(|e| {
        tracing::error!(
            "Extraction failed: {}. Very high thresholds fragment the graph; \
             check the component sizes at the failing threshold.",
            e
        );
        e
    })?;

    write_features(&features, args.output_file.as_deref())?;
    tracing::info!("Extraction complete: {} features", features.len());
    Ok(())
}

fn write_features(features: &FeatureMap, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(features)?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
