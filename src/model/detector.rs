//! Fraud Detector - shared scoring service

use super::encoding::FeatureInput;
use super::{ModelArtifacts, ModelError};

/// Scores below this are flagged as fraud
pub const DEFAULT_THRESHOLD: f64 = -0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub is_fraud: bool,
    /// Anomaly score from the forest; lower is more suspicious
    pub probability: f64,
}

/// Built once at startup and shared through `AppState`
#[derive(Debug)]
pub struct FraudDetector {
    artifacts: ModelArtifacts,
    threshold: f64,
}

impl FraudDetector {
    pub fn new(artifacts: ModelArtifacts, threshold: f64) -> Result<Self, ModelError> {
        artifacts.validate()?;
        if !threshold.is_finite() {
            return Err(ModelError::InvalidConfig(format!("threshold must be finite, got {}", threshold)));
        }
        Ok(Self { artifacts, threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn feature_count(&self) -> usize {
        self.artifacts.feature_columns.len()
    }

    pub fn score(&self, input: &FeatureInput<'_>) -> Result<Score, ModelError> {
        let row = self.artifacts.feature_columns.encode(input);
        let scaled = self.artifacts.scaler.transform(&row)?;
        let probability = self.artifacts.model.decision_function(&scaled)?;

        Ok(Score {
            is_fraud: probability < self.threshold,
            probability,
        })
    }
}
