//! elasticnet Command Line Interface
//!
//! Fits elastic-net linear regression models on LibSVM-format data and traces
//! regularization paths.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use elasticnet::api::{ElasticNet, ModelInfo, RegressionMetrics, RegularizationPath};
use elasticnet::core::{ElasticNetError, OptimizerConfig, Result};
use elasticnet::{FeatureStore, LibSVMDataset, LinearModel};
use env_logger::Env;
use log::{error, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "elasticnet")]
#[command(about = "Elastic-net linear regression by coordinate descent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "elasticnet contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model and print a JSON report
    Fit(FitArgs),
    /// Fit a descending sequence of penalties with warm starts
    Path(PathArgs),
}

#[derive(Args)]
struct FitArgs {
    /// Training data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Optimizer configuration file (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Penalty strength lambda
    #[arg(short, long)]
    regularization: Option<f64>,

    /// Share of the penalty given to the L1 term
    #[arg(short, long)]
    l1_ratio: Option<f64>,

    /// Restrict most sweeps to the non-zero coefficients
    #[arg(long)]
    active_set: bool,

    /// Maximum iterations
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Convergence tolerance, absolute and relative
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Test data file to evaluate the fitted model on
    #[arg(short, long)]
    test: Option<PathBuf>,

    /// Also write the report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PathArgs {
    /// Training data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Number of penalties on the path
    #[arg(short, long, default_value = "20")]
    n_lambdas: usize,

    /// Smallest penalty as a fraction of the largest
    #[arg(short, long, default_value = "0.01")]
    ratio: f64,

    /// Share of the penalty given to the L1 term
    #[arg(short, long, default_value = "1.0")]
    l1_ratio: f64,

    /// Restrict most sweeps to the non-zero coefficients
    #[arg(long)]
    active_set: bool,

    /// Maximum iterations per penalty
    #[arg(short, long, default_value = "500")]
    max_iterations: usize,
}

#[derive(Serialize)]
struct Coefficient {
    /// 1-based, as in the data file
    feature: usize,
    value: f64,
}

#[derive(Serialize)]
struct FitReport {
    data: PathBuf,
    fitted_at: DateTime<Utc>,
    regularization: f64,
    l1_ratio: f64,
    active_set: bool,
    model: ModelInfo,
    coefficients: Vec<Coefficient>,
    training: RegressionMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    test: Option<RegressionMetrics>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Fit(args) => fit_command(args),
        Commands::Path(args) => path_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

/// Configuration file (or defaults) with command line overrides applied
fn resolve_config(args: &FitArgs) -> Result<OptimizerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path:?}");
            OptimizerConfig::from_json_file(path)?
        }
        None => OptimizerConfig::default(),
    };

    if let Some(regularization) = args.regularization {
        config.regularization = regularization;
    }
    if let Some(l1_ratio) = args.l1_ratio {
        config.l1_ratio = l1_ratio;
    }
    if args.active_set {
        config.active_set = true;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(epsilon) = args.epsilon {
        config.absolute_epsilon = epsilon;
        config.relative_epsilon = epsilon;
    }

    config.validate()?;
    Ok(config)
}

fn fit_command(args: FitArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    info!("Fitting elastic-net model...");
    info!("Data file: {:?}", args.data);
    info!(
        "Parameters: regularization={}, l1_ratio={}, active_set={}, max_iter={}",
        config.regularization, config.l1_ratio, config.active_set, config.max_iterations
    );

    let (data, labels) = LibSVMDataset::from_file(&args.data)?.into_parts()?;
    if labels.is_empty() {
        return Err(ElasticNetError::EmptyDataset);
    }
    info!(
        "Loaded {} data points with {} features",
        labels.len(),
        data.n_features()
    );

    let fitted = ElasticNet::new().with_config(config.clone()).fit(&data, &labels)?;
    let training = fitted.evaluate(&data, &labels)?;
    info!("Training R²: {:.4}", training.r2);

    let test = match &args.test {
        Some(path) => {
            info!("Loading test data from: {path:?}");
            let (test_data, test_labels) =
                LibSVMDataset::from_file(path)?.into_parts_with_features(data.n_features())?;
            let metrics = fitted.evaluate(&test_data, &test_labels)?;
            info!("Test R²: {:.4}", metrics.r2);
            Some(metrics)
        }
        None => None,
    };

    let report = FitReport {
        data: args.data.clone(),
        fitted_at: Utc::now(),
        regularization: config.regularization,
        l1_ratio: config.l1_ratio,
        active_set: config.active_set,
        model: fitted.info(),
        coefficients: fitted
            .model()
            .nonzero_coefficients()
            .into_iter()
            .map(|(feature, value)| Coefficient {
                feature: feature + 1,
                value,
            })
            .collect(),
        training,
        test,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(output) = &args.output {
        let writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(writer, &report)?;
        info!("Report saved to: {output:?}");
    }

    Ok(())
}

fn path_command(args: PathArgs) -> Result<()> {
    info!(
        "Regularization path on {:?}: {} penalties down to ratio {}",
        args.data, args.n_lambdas, args.ratio
    );

    let (data, labels) = LibSVMDataset::from_file(&args.data)?.into_parts()?;
    if labels.is_empty() {
        return Err(ElasticNetError::EmptyDataset);
    }

    let estimator = ElasticNet::new()
        .with_l1_ratio(args.l1_ratio)
        .with_active_set(args.active_set)
        .with_max_iterations(args.max_iterations);
    let points = RegularizationPath::new(estimator, args.n_lambdas, args.ratio)?.fit(&data, &labels)?;

    println!("# step regularization nonzero loss");
    for (step, point) in points.iter().enumerate() {
        println!(
            "{} {:.6e} {} {:.6}",
            step, point.regularization, point.n_nonzero, point.loss
        );
    }

    Ok(())
}
