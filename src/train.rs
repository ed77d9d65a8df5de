//! Training stage
//!
//! Fits the spam classifier on the processed dataset and saves the artifact
//! the evaluation and drift stages consume.
use crate::data::Dataset;
use crate::errors::DriftError;
use crate::features::FEATURE_COLUMNS;
use crate::metric::{accuracy, roc_auc_score};
use crate::model::SpamClassifier;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Configuration for the training stage.
pub struct TrainConfig {
    /// Processed dataset with the feature columns and `target`.
    pub data_path: PathBuf,
    /// Destination for the model artifact.
    pub model_path: PathBuf,
    /// Holdout fraction.
    pub test_size: f64,
    /// Seed for the stratified split.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            data_path: PathBuf::from("data/processed/processed.csv"),
            model_path: PathBuf::from("model_store/spam_classifier.json"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Holdout metrics reported by a training run.
pub struct TrainSummary {
    pub accuracy: f64,
    pub roc_auc: f64,
}

/// Deterministic stratified split.
///
/// Shuffles each class separately with a seeded rng and moves
/// `test_size` of every class into the holdout, so class balance is
/// preserved and the same seed always yields the same partition.
pub fn stratified_split(y: &[f64], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [0.0, 1.0] {
        let mut indices: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_size).round() as usize;
        test.extend(&indices[..n_test]);
        train.extend(&indices[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

fn gather(columns: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|column| indices.iter().map(|&i| column[i]).collect())
        .collect()
}

/// Run the training stage: fit on the train partition, score the holdout,
/// save the artifact.
pub fn run_training(config: &TrainConfig) -> Result<TrainSummary, DriftError> {
    let dataset = Dataset::read(&config.data_path)?;
    let mut required: Vec<&str> = FEATURE_COLUMNS.to_vec();
    required.push("target");
    dataset.require_columns(&required)?;

    let columns: Vec<Vec<f64>> = FEATURE_COLUMNS
        .iter()
        .map(|name| dataset.numeric_column(name))
        .collect::<Result<_, _>>()?;
    let y = dataset.numeric_column("target")?;

    let (train_idx, test_idx) = stratified_split(&y, config.test_size, config.seed);
    let train_columns = gather(&columns, &train_idx);
    let train_y: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let test_columns = gather(&columns, &test_idx);
    let test_y: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    let model = SpamClassifier::fit(&FEATURE_COLUMNS, &train_columns, &train_y);

    let proba = model.predict_proba_columns(&test_columns, test_y.len());
    let pred: Vec<f64> = proba.iter().map(|p| f64::from(u8::from(*p >= 0.5))).collect();
    let summary = TrainSummary {
        accuracy: accuracy(&test_y, &pred),
        roc_auc: roc_auc_score(&test_y, &proba),
    };

    if let Some(parent) = config.model_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    model.save(&config.model_path.to_string_lossy())?;

    info!(
        "trained model saved to {} (accuracy {:.4}, roc_auc {:.4})",
        config.model_path.display(),
        summary.accuracy,
        summary.roc_auc
    );
    Ok(summary)
}
