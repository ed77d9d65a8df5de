//! Evaluation stage
//!
//! Scores the trained classifier on the holdout partition and persists the
//! evaluation report the registration gate and the drift check read back.
use crate::data::Dataset;
use crate::errors::DriftError;
use crate::features::FEATURE_COLUMNS;
use crate::metric::{confusion_matrix, precision, recall, roc_auc_score};
use crate::model::SpamClassifier;
use crate::train::stratified_split;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Configuration for the evaluation stage.
pub struct EvaluateConfig {
    /// Processed dataset with the feature columns and `target`.
    pub data_path: PathBuf,
    /// Trained model artifact; required here, unlike in the drift check.
    pub model_path: PathBuf,
    /// Destination for the evaluation report.
    pub report_path: PathBuf,
    /// Holdout fraction; must match training for an honest holdout.
    pub test_size: f64,
    /// Seed for the stratified split; must match training.
    pub seed: u64,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        EvaluateConfig {
            data_path: PathBuf::from("data/processed/processed.csv"),
            model_path: PathBuf::from("model_store/spam_classifier.json"),
            report_path: PathBuf::from("reports/eval.json"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Confusion matrix block of the evaluation report.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConfusionBlock {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

/// Persisted evaluation report; `metrics.roc_auc` is the drift check's
/// baseline.
#[derive(Debug, Deserialize, Serialize)]
pub struct EvalReport {
    pub metrics: BTreeMap<String, f64>,
    pub confusion_matrix: ConfusionBlock,
    pub n_test_samples: usize,
}

/// Run the evaluation stage and persist the report.
pub fn run_evaluation(config: &EvaluateConfig) -> Result<EvalReport, DriftError> {
    let dataset = Dataset::read(&config.data_path)?;
    let mut required: Vec<&str> = FEATURE_COLUMNS.to_vec();
    required.push("target");
    dataset.require_columns(&required)?;

    if !config.model_path.exists() {
        return Err(DriftError::ArtifactNotFound(
            config.model_path.display().to_string(),
        ));
    }
    let model = SpamClassifier::load(&config.model_path.to_string_lossy())?;

    let columns: Vec<Vec<f64>> = FEATURE_COLUMNS
        .iter()
        .map(|name| dataset.numeric_column(name))
        .collect::<Result<_, _>>()?;
    let y = dataset.numeric_column("target")?;

    let (_, test_idx) = stratified_split(&y, config.test_size, config.seed);
    let test_columns: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| test_idx.iter().map(|&i| column[i]).collect())
        .collect();
    let test_y: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    let proba = model.predict_proba_columns(&test_columns, test_y.len());
    let pred: Vec<f64> = proba.iter().map(|p| f64::from(u8::from(*p >= 0.5))).collect();

    let mut metrics = BTreeMap::new();
    metrics.insert("roc_auc".to_string(), roc_auc_score(&test_y, &proba));
    metrics.insert("precision".to_string(), precision(&test_y, &pred));
    metrics.insert("recall".to_string(), recall(&test_y, &pred));

    let matrix = confusion_matrix(&test_y, &pred);
    let report = EvalReport {
        metrics,
        confusion_matrix: ConfusionBlock {
            labels: vec!["ham".to_string(), "spam".to_string()],
            matrix: matrix.iter().map(|row| row.to_vec()).collect(),
        },
        n_test_samples: test_y.len(),
    };

    if let Some(parent) = config.report_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    let payload =
        serde_json::to_string_pretty(&report).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    fs::write(&config.report_path, payload).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

    info!(
        "evaluation report saved to {} over {} holdout rows",
        config.report_path.display(),
        report.n_test_samples
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::{run_training, TrainConfig};
    use std::fs;
    use tempfile::TempDir;

    fn write_processed(dir: &TempDir) -> PathBuf {
        let mut content = String::from(
            "char_len,word_len,num_digits,num_urls,num_domains,upper_ratio,target\n",
        );
        for i in 0..40 {
            let jitter = (i % 5) as f64;
            if i % 2 == 1 {
                content.push_str(&format!("{},{},12,2,1,0.6,1\n", 140.0 + jitter, 25));
            } else {
                content.push_str(&format!("{},{},0,0,0,0.05,0\n", 40.0 + jitter, 8));
            }
        }
        let path = dir.path().join("processed.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_evaluation_writes_report() {
        let dir = TempDir::new().unwrap();
        let data_path = write_processed(&dir);
        let model_path = dir.path().join("model.json");
        run_training(&TrainConfig {
            data_path: data_path.clone(),
            model_path: model_path.clone(),
            ..TrainConfig::default()
        })
        .unwrap();

        let config = EvaluateConfig {
            data_path,
            model_path,
            report_path: dir.path().join("reports/eval.json"),
            ..EvaluateConfig::default()
        };
        let report = run_evaluation(&config).unwrap();

        assert_eq!(report.n_test_samples, 8);
        assert!(report.metrics["roc_auc"] > 0.9);
        assert_eq!(report.confusion_matrix.labels, vec!["ham", "spam"]);

        // The persisted document round-trips.
        let raw = fs::read_to_string(&config.report_path).unwrap();
        let parsed: EvalReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.metrics["roc_auc"], report.metrics["roc_auc"]);
    }

    #[test]
    fn test_run_evaluation_requires_model() {
        let dir = TempDir::new().unwrap();
        let config = EvaluateConfig {
            data_path: write_processed(&dir),
            model_path: dir.path().join("missing.json"),
            report_path: dir.path().join("eval.json"),
            ..EvaluateConfig::default()
        };
        assert!(matches!(
            run_evaluation(&config),
            Err(DriftError::ArtifactNotFound(_))
        ));
    }
}
