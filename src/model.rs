//! Model
//!
//! The registered classifier artifact: a standardized logistic-regression
//! model over the engineered SMS features, persisted as a json document.
use crate::errors::DriftError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Number of full-batch gradient descent passes.
const FIT_EPOCHS: usize = 500;
/// Gradient descent step size.
const LEARNING_RATE: f64 = 0.1;

/// Convert log odds to probability.
#[inline]
fn odds(v: f64) -> f64 {
    1. / (1. + (-v).exp())
}

/// Logistic-regression spam classifier.
///
/// Features are standardized with the means and deviations captured at fit
/// time, so the artifact is self-contained: deserialize and call
/// [`SpamClassifier::predict_proba`].
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpamClassifier {
    /// Feature columns the model was fit on, in weight order.
    pub feature_names: Vec<String>,
    /// Per-feature training means used for standardization.
    pub means: Vec<f64>,
    /// Per-feature training standard deviations used for standardization.
    pub stds: Vec<f64>,
    /// Learned coefficients, one per feature.
    pub weights: Vec<f64>,
    /// Learned intercept.
    pub bias: f64,
}

impl SpamClassifier {
    /// Fit the classifier with full-batch gradient descent on log loss.
    ///
    /// Deterministic: fixed epoch count and step size, no shuffling.
    ///
    /// * `feature_names` - Column names, one per feature, in column order.
    /// * `columns` - Feature values, column-major, all of equal length.
    /// * `y` - Binary targets, 0 or 1.
    pub fn fit(feature_names: &[&str], columns: &[Vec<f64>], y: &[f64]) -> Self {
        let n_features = columns.len();
        let n_rows = y.len();

        let mut means = vec![0.0; n_features];
        let mut stds = vec![0.0; n_features];
        for (j, column) in columns.iter().enumerate() {
            let mean = column.iter().sum::<f64>() / n_rows as f64;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_rows as f64;
            means[j] = mean;
            // Constant columns get a unit deviation so they standardize to zero.
            stds[j] = if var.sqrt() > 0.0 { var.sqrt() } else { 1.0 };
        }

        let standardized: Vec<Vec<f64>> = columns
            .iter()
            .enumerate()
            .map(|(j, column)| column.iter().map(|v| (v - means[j]) / stds[j]).collect())
            .collect();

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        for _ in 0..FIT_EPOCHS {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;
            for i in 0..n_rows {
                let mut z = bias;
                for j in 0..n_features {
                    z += weights[j] * standardized[j][i];
                }
                let residual = odds(z) - y[i];
                for j in 0..n_features {
                    grad_w[j] += residual * standardized[j][i];
                }
                grad_b += residual;
            }
            for j in 0..n_features {
                weights[j] -= LEARNING_RATE * grad_w[j] / n_rows as f64;
            }
            bias -= LEARNING_RATE * grad_b / n_rows as f64;
        }

        SpamClassifier {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            means,
            stds,
            weights,
            bias,
        }
    }

    /// Positive-class probability for one row of raw feature values.
    ///
    /// * `features` - Values in the same order as `feature_names`.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(features)
            .zip(self.means.iter().zip(&self.stds))
            .map(|((w, v), (mean, std))| w * (v - mean) / std)
            .sum::<f64>()
            + self.bias;
        odds(z)
    }

    /// Positive-class probabilities for column-major feature data.
    pub fn predict_proba_columns(&self, columns: &[Vec<f64>], n_rows: usize) -> Vec<f64> {
        (0..n_rows)
            .map(|i| {
                let row: Vec<f64> = columns.iter().map(|c| c[i]).collect();
                self.predict_proba(&row)
            })
            .collect()
    }

    /// Save the classifier as a json object to a file.
    ///
    /// * `path` - Path to save the classifier.
    pub fn save(&self, path: &str) -> Result<(), DriftError> {
        let model = self.json_dump()?;
        match fs::write(path, model) {
            Err(e) => Err(DriftError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Dump the classifier as a json object.
    pub fn json_dump(&self) -> Result<String, DriftError> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(DriftError::UnableToWrite(e.to_string())),
        }
    }

    /// Load a classifier from a json string.
    pub fn from_json(json_str: &str) -> Result<Self, DriftError> {
        match serde_json::from_str::<SpamClassifier>(json_str) {
            Ok(m) => Ok(m),
            Err(e) => Err(DriftError::UnableToRead(e.to_string())),
        }
    }

    /// Load a classifier from a path to a json artifact.
    ///
    /// * `path` - Path to load the classifier from.
    pub fn load(path: &str) -> Result<Self, DriftError> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(DriftError::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }
}
