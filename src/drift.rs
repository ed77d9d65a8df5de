//! Drift check
//!
//! Compares a reference dataset against a production batch, feature by
//! feature (PSI + KS) and metric-wise (ROC-AUC against the recorded
//! baseline), aggregates a single drift decision and persists the report the
//! scheduler branches on.
use crate::data::Dataset;
use crate::errors::DriftError;
use crate::features::FEATURE_COLUMNS;
use crate::metric::roc_auc_score;
use crate::model::SpamClassifier;
use crate::stats::{
    kolmogorov_smirnov_stat, population_stability_index, DEFAULT_MIN_FRACTION, DEFAULT_PSI_BINS,
};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one drift check invocation.
///
/// Thresholds and paths travel together through the call instead of living
/// in process-wide state; the caller owns them.
#[derive(Debug, Clone)]
pub struct DriftCheckConfig {
    /// Reference (training) dataset.
    pub reference_path: PathBuf,
    /// Recent production batch with the same feature columns.
    pub production_path: PathBuf,
    /// Registered model used for the metric check.
    pub model_path: PathBuf,
    /// Baseline evaluation report; optional at runtime.
    pub baseline_report_path: PathBuf,
    /// Where to write the drift report.
    pub report_path: PathBuf,
    /// PSI value at or above which a feature counts as drifted.
    pub psi_threshold: f64,
    /// KS statistic at or above which a feature counts as drifted.
    pub ks_threshold: f64,
    /// ROC-AUC drop at or above which the metric counts as drifted.
    pub metric_drop_threshold: f64,
    /// Number of quantile bins for PSI.
    pub psi_bins: usize,
}

impl Default for DriftCheckConfig {
    fn default() -> Self {
        DriftCheckConfig {
            reference_path: PathBuf::from("data/processed/processed.csv"),
            production_path: PathBuf::from("data/production/recent.csv"),
            model_path: PathBuf::from("model_store/production/spam_classifier.json"),
            baseline_report_path: PathBuf::from("reports/eval.json"),
            report_path: PathBuf::from("reports/drift_report.json"),
            psi_threshold: 0.2,
            ks_threshold: 0.15,
            metric_drop_threshold: 0.05,
            psi_bins: DEFAULT_PSI_BINS,
        }
    }
}

/// Distribution-shift result for one feature column.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeatureDrift {
    pub psi: f64,
    pub ks: f64,
    pub drift: bool,
}

/// Performance-shift result for the model metric.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricDrift {
    pub baseline_roc_auc: Option<f64>,
    pub current_roc_auc: Option<f64>,
    pub drop: Option<f64>,
    pub drift: bool,
}

/// The persisted drift report. Written once per invocation, never mutated,
/// replaced wholesale by the next run.
#[derive(Debug, Deserialize, Serialize)]
pub struct DriftReport {
    pub generated_at: String,
    pub reference_path: String,
    pub production_path: String,
    pub model_path: String,
    pub baseline_report_path: String,
    pub psi_threshold: f64,
    pub ks_threshold: f64,
    pub metric_drop_threshold: f64,
    pub features: BTreeMap<String, FeatureDrift>,
    pub metrics: MetricDrift,
    pub drift_detected: bool,
}

/// Read a metric from a previously persisted evaluation report.
///
/// A missing report file and a missing metric key are the same condition:
/// no baseline, `None`. A report that exists but cannot be read or decoded
/// is an error.
pub fn baseline_metric(report_path: &Path, metric_name: &str) -> Result<Option<f64>, DriftError> {
    if !report_path.exists() {
        return Ok(None);
    }
    let raw =
        fs::read_to_string(report_path).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    Ok(payload
        .get("metrics")
        .and_then(|metrics| metrics.get(metric_name))
        .and_then(|value| value.as_f64()))
}

/// ROC-AUC of the registered model on the production batch.
///
/// `None` when the batch carries no `target` column or no artifact exists
/// at `model_path` - partial-data runs are expected, not an error.
pub fn current_roc_auc(
    model_path: &Path,
    production: &Dataset,
) -> Result<Option<f64>, DriftError> {
    if !production.has_column("target") {
        return Ok(None);
    }
    if !model_path.exists() {
        return Ok(None);
    }
    let model = SpamClassifier::load(&model_path.to_string_lossy())?;

    let columns: Vec<Vec<f64>> = FEATURE_COLUMNS
        .iter()
        .map(|name| production.numeric_column(name))
        .collect::<Result<_, _>>()?;
    let y = production.numeric_column("target")?;

    let proba = model.predict_proba_columns(&columns, y.len());
    Ok(Some(roc_auc_score(&y, &proba)))
}

/// Run the drift check and persist the report.
///
/// Loads both datasets, computes PSI and KS per feature column in declared
/// order, compares the model metric against its baseline, and ORs everything
/// into `drift_detected`. Fail-fast: loader or statistic failures propagate
/// and no report is written.
pub fn run_drift_check(config: &DriftCheckConfig) -> Result<DriftReport, DriftError> {
    let reference = Dataset::read(&config.reference_path)?;
    let production = Dataset::read(&config.production_path)?;
    reference.require_columns(&FEATURE_COLUMNS)?;
    production.require_columns(&FEATURE_COLUMNS)?;

    let mut features = BTreeMap::new();
    let mut feature_drift = false;
    for column in FEATURE_COLUMNS {
        let ref_values = reference.numeric_column(column)?;
        let prod_values = production.numeric_column(column)?;
        let psi = population_stability_index(
            &ref_values,
            &prod_values,
            config.psi_bins,
            DEFAULT_MIN_FRACTION,
        )?;
        let ks = kolmogorov_smirnov_stat(&ref_values, &prod_values)?;
        let drift = psi >= config.psi_threshold || ks >= config.ks_threshold;
        feature_drift = feature_drift || drift;
        features.insert(column.to_string(), FeatureDrift { psi, ks, drift });
    }

    let baseline_roc_auc = baseline_metric(&config.baseline_report_path, "roc_auc")?;
    let current = current_roc_auc(&config.model_path, &production)?;
    let (drop, metric_drift) = match (baseline_roc_auc, current) {
        (Some(baseline), Some(current)) => {
            let drop = baseline - current;
            (Some(drop), drop >= config.metric_drop_threshold)
        }
        _ => (None, false),
    };

    let drift_detected = feature_drift || metric_drift;

    let report = DriftReport {
        generated_at: Utc::now().to_rfc3339(),
        reference_path: config.reference_path.display().to_string(),
        production_path: config.production_path.display().to_string(),
        model_path: config.model_path.display().to_string(),
        baseline_report_path: config.baseline_report_path.display().to_string(),
        psi_threshold: config.psi_threshold,
        ks_threshold: config.ks_threshold,
        metric_drop_threshold: config.metric_drop_threshold,
        features,
        metrics: MetricDrift {
            baseline_roc_auc,
            current_roc_auc: current,
            drop,
            drift: metric_drift,
        },
        drift_detected,
    };

    if let Some(parent) = config.report_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    let payload = serde_json::to_string_pretty(&report)
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    fs::write(&config.report_path, payload)
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

    info!(
        "drift report saved to {} (drift_detected={})",
        config.report_path.display(),
        report.drift_detected
    );
    Ok(report)
}
