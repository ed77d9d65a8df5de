//! Driftwatch CLI
//!
//! Pipeline entry point for the SMS spam classifier: download, preprocess,
//! train, evaluate, register, and the periodic drift check the scheduler
//! invokes.
//!
//! # Usage
//!
//! ```bash
//! driftwatch download
//! driftwatch preprocess
//! driftwatch train
//! driftwatch evaluate
//! driftwatch register --threshold 0.9
//! driftwatch drift-check --fail-on-drift
//! ```
use clap::{Parser, Subcommand};
use driftwatch::download::download_raw_dataset;
use driftwatch::drift::{run_drift_check, DriftCheckConfig};
use driftwatch::evaluate::{run_evaluation, EvaluateConfig};
use driftwatch::features::preprocess;
use driftwatch::register::{register_model, RegisterConfig};
use driftwatch::train::{run_training, TrainConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "driftwatch", about = "Drift monitoring pipeline for an SMS spam classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the raw SMS spam dataset
    Download(DownloadArgs),
    /// Extract feature columns from the raw dataset
    Preprocess(PreprocessArgs),
    /// Train the spam classifier
    Train(TrainArgs),
    /// Evaluate the trained classifier and write the baseline report
    Evaluate(EvaluateArgs),
    /// Register the model if evaluation passes the threshold
    Register(RegisterArgs),
    /// Run drift checks on features and performance
    DriftCheck(DriftCheckArgs),
}

#[derive(clap::Args)]
struct DownloadArgs {
    /// Where to write the raw dataset
    #[arg(long, default_value = "data/raw/sms_spam.csv")]
    out_path: PathBuf,
}

#[derive(clap::Args)]
struct PreprocessArgs {
    /// Raw dataset written by the download stage
    #[arg(long, default_value = "data/raw/sms_spam.csv")]
    raw_path: PathBuf,
    /// Where to write the processed dataset
    #[arg(long, default_value = "data/processed/processed.csv")]
    out_path: PathBuf,
}

#[derive(clap::Args)]
struct TrainArgs {
    /// Processed dataset with features and target
    #[arg(long, default_value = "data/processed/processed.csv")]
    data_path: PathBuf,
    /// Where to save the trained model
    #[arg(long, default_value = "model_store/spam_classifier.json")]
    model_path: PathBuf,
    /// Holdout fraction
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
    /// Split seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(clap::Args)]
struct EvaluateArgs {
    /// Processed dataset with features and target
    #[arg(long, default_value = "data/processed/processed.csv")]
    data_path: PathBuf,
    /// Trained model artifact
    #[arg(long, default_value = "model_store/spam_classifier.json")]
    model_path: PathBuf,
    /// Where to write the evaluation report
    #[arg(long, default_value = "reports/eval.json")]
    report_path: PathBuf,
    /// Holdout fraction; must match training
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
    /// Split seed; must match training
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(clap::Args)]
struct RegisterArgs {
    /// Trained model artifact
    #[arg(long, default_value = "model_store/spam_classifier.json")]
    model_path: PathBuf,
    /// Destination path for the registered model
    #[arg(long, default_value = "model_store/production/spam_classifier.json")]
    registry_path: PathBuf,
    /// Evaluation report json
    #[arg(long, default_value = "reports/eval.json")]
    report_path: PathBuf,
    /// Metric from the report that must satisfy the threshold
    #[arg(long, default_value = "roc_auc")]
    metric: String,
    /// Minimum metric value required to register the model
    #[arg(long, default_value_t = 0.9)]
    threshold: f64,
}

#[derive(clap::Args)]
struct DriftCheckArgs {
    /// Reference/train dataset with features and optional target
    #[arg(long, default_value = "data/processed/processed.csv")]
    reference_path: PathBuf,
    /// Recent production batch with the same columns as the reference dataset
    #[arg(long, default_value = "data/production/recent.csv")]
    production_path: PathBuf,
    /// Registered model used for the metric check
    #[arg(long, default_value = "model_store/production/spam_classifier.json")]
    model_path: PathBuf,
    /// Baseline evaluation report (json) with metrics; optional
    #[arg(long, default_value = "reports/eval.json")]
    baseline_report_path: PathBuf,
    /// Where to write the drift report
    #[arg(long, default_value = "reports/drift_report.json")]
    report_path: PathBuf,
    /// PSI threshold for the drift flag
    #[arg(long, default_value_t = 0.2)]
    psi_threshold: f64,
    /// KS statistic threshold for the drift flag
    #[arg(long, default_value_t = 0.15)]
    ks_threshold: f64,
    /// Absolute ROC-AUC drop allowed before triggering drift
    #[arg(long, default_value_t = 0.05)]
    metric_drop_threshold: f64,
    /// Number of quantile bins for PSI
    #[arg(long, default_value_t = 10)]
    psi_bins: usize,
    /// Return a non-zero exit code when drift is detected
    #[arg(long)]
    fail_on_drift: bool,
}

fn run_command(cli: Cli) -> Result<ExitCode, driftwatch::errors::DriftError> {
    match cli.command {
        Command::Download(args) => {
            let rows = download_raw_dataset(&args.out_path)?;
            println!("Saved {} rows to {}", rows, args.out_path.display());
        }
        Command::Preprocess(args) => {
            let rows = preprocess(&args.raw_path, &args.out_path)?;
            println!("Saved {} processed rows to {}", rows, args.out_path.display());
        }
        Command::Train(args) => {
            let summary = run_training(&TrainConfig {
                data_path: args.data_path,
                model_path: args.model_path.clone(),
                test_size: args.test_size,
                seed: args.seed,
            })?;
            println!("Model saved to {}", args.model_path.display());
            println!("Accuracy: {:.4}", summary.accuracy);
            println!("ROC AUC: {:.4}", summary.roc_auc);
        }
        Command::Evaluate(args) => {
            let report_path = args.report_path.clone();
            let report = run_evaluation(&EvaluateConfig {
                data_path: args.data_path,
                model_path: args.model_path,
                report_path: args.report_path,
                test_size: args.test_size,
                seed: args.seed,
            })?;
            println!("Evaluation metrics:");
            for (name, value) in &report.metrics {
                println!("  {name}: {value:.4}");
            }
            println!("Report saved to {}", report_path.display());
        }
        Command::Register(args) => {
            let registry_path = args.registry_path.clone();
            let metric = args.metric.clone();
            let threshold = args.threshold;
            let value = register_model(&RegisterConfig {
                model_path: args.model_path,
                registry_path: args.registry_path,
                report_path: args.report_path,
                metric: args.metric,
                threshold: args.threshold,
            })?;
            println!(
                "Model registered at {} based on {}={:.4} >= {:.4}",
                registry_path.display(),
                metric,
                value,
                threshold
            );
        }
        Command::DriftCheck(args) => {
            let report_path = args.report_path.clone();
            let report = run_drift_check(&DriftCheckConfig {
                reference_path: args.reference_path,
                production_path: args.production_path,
                model_path: args.model_path,
                baseline_report_path: args.baseline_report_path,
                report_path: args.report_path,
                psi_threshold: args.psi_threshold,
                ks_threshold: args.ks_threshold,
                metric_drop_threshold: args.metric_drop_threshold,
                psi_bins: args.psi_bins,
            })?;
            let status = if report.drift_detected {
                "DRIFT DETECTED"
            } else {
                "No drift detected"
            };
            println!("{status}");
            println!("Report saved to {}", report_path.display());
            if args.fail_on_drift && report.drift_detected {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
