//! Registration stage
//!
//! Promotes a trained model into the production registry path, gated on the
//! evaluation report meeting a metric threshold. Unlike the drift check's
//! tolerant baseline read, a missing report or metric here is an error: a
//! model must never be registered blind.
use crate::errors::DriftError;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the registration stage.
pub struct RegisterConfig {
    /// Trained model artifact.
    pub model_path: PathBuf,
    /// Destination path in the production registry.
    pub registry_path: PathBuf,
    /// Evaluation report the gate reads.
    pub report_path: PathBuf,
    /// Metric that must satisfy the threshold.
    pub metric: String,
    /// Minimum metric value required to register.
    pub threshold: f64,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        RegisterConfig {
            model_path: PathBuf::from("model_store/spam_classifier.json"),
            registry_path: PathBuf::from("model_store/production/spam_classifier.json"),
            report_path: PathBuf::from("reports/eval.json"),
            metric: "roc_auc".to_string(),
            threshold: 0.9,
        }
    }
}

/// Strict metric read: the report and the key must both exist.
fn read_metric(report_path: &Path, metric_name: &str) -> Result<f64, DriftError> {
    if !report_path.exists() {
        return Err(DriftError::ArtifactNotFound(
            report_path.display().to_string(),
        ));
    }
    let raw =
        fs::read_to_string(report_path).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
    payload
        .get("metrics")
        .and_then(|metrics| metrics.get(metric_name))
        .and_then(|value| value.as_f64())
        .ok_or_else(|| {
            DriftError::MissingMetric(metric_name.to_string(), report_path.display().to_string())
        })
}

/// Run the registration stage. Returns the gating metric's value.
pub fn register_model(config: &RegisterConfig) -> Result<f64, DriftError> {
    let value = read_metric(&config.report_path, &config.metric)?;
    if value < config.threshold {
        return Err(DriftError::BelowThreshold {
            metric: config.metric.clone(),
            value,
            threshold: config.threshold,
        });
    }
    if !config.model_path.exists() {
        return Err(DriftError::ArtifactNotFound(
            config.model_path.display().to_string(),
        ));
    }

    if let Some(parent) = config.registry_path.parent() {
        fs::create_dir_all(parent).map_err(|e| DriftError::UnableToWrite(e.to_string()))?;
    }
    fs::copy(&config.model_path, &config.registry_path)
        .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

    info!(
        "model registered at {} based on {}={:.4} >= {:.4}",
        config.registry_path.display(),
        config.metric,
        value,
        config.threshold
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(dir: &TempDir, roc_auc: f64) -> RegisterConfig {
        let report_path = dir.path().join("eval.json");
        fs::write(
            &report_path,
            format!("{{\"metrics\": {{\"roc_auc\": {roc_auc}}}}}"),
        )
        .unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, "{}").unwrap();
        RegisterConfig {
            model_path,
            registry_path: dir.path().join("production/model.json"),
            report_path,
            ..RegisterConfig::default()
        }
    }

    #[test]
    fn test_register_copies_artifact_when_gate_passes() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir, 0.95);
        let value = register_model(&config).unwrap();
        assert_eq!(value, 0.95);
        assert!(config.registry_path.exists());
    }

    #[test]
    fn test_register_refuses_below_threshold() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir, 0.5);
        assert!(matches!(
            register_model(&config),
            Err(DriftError::BelowThreshold { .. })
        ));
        assert!(!config.registry_path.exists());
    }

    #[test]
    fn test_register_requires_report_and_metric() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(&dir, 0.95);
        config.report_path = dir.path().join("missing.json");
        assert!(matches!(
            register_model(&config),
            Err(DriftError::ArtifactNotFound(_))
        ));

        let sparse = dir.path().join("sparse.json");
        fs::write(&sparse, "{\"metrics\": {}}").unwrap();
        config.report_path = sparse;
        assert!(matches!(
            register_model(&config),
            Err(DriftError::MissingMetric(_, _))
        ));
    }

    #[test]
    fn test_register_requires_model_artifact() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(&dir, 0.95);
        config.model_path = dir.path().join("missing_model.json");
        assert!(matches!(
            register_model(&config),
            Err(DriftError::ArtifactNotFound(_))
        ));
    }
}
