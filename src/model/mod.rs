//! Model Module - Fraud Scoring
//!
//! Provisions the model artifact set (isolation forest, scaler, feature
//! schema) and wraps it in a [`FraudDetector`] that handlers share.

pub mod detector;
pub mod encoding;
pub mod isolation_forest;
pub mod scaler;
pub mod storage;
pub mod synthetic;

use std::path::Path;

pub use detector::{FraudDetector, Score};
pub use encoding::{FeatureInput, FeatureSchema};
pub use isolation_forest::{ForestParams, IsolationForest};
pub use scaler::StandardScaler;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("feature shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("training dataset is empty")]
    EmptyDataset,

    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),
}

/// Training parameters for the fallback path
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub contamination: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            seed: 42,
        }
    }
}

/// Trained scorer, fitted scaler and the column order both expect
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub model: IsolationForest,
    pub scaler: StandardScaler,
    pub feature_columns: FeatureSchema,
}

impl ModelArtifacts {
    pub fn validate(&self) -> Result<(), ModelError> {
        self.scaler.validate()?;
        self.model.validate()?;

        let expected = self.feature_columns.len();
        for actual in [self.scaler.n_features(), self.model.n_features] {
            if actual != expected {
                return Err(ModelError::ShapeMismatch { expected, actual });
            }
        }
        Ok(())
    }
}

/// Load saved artifacts from `dir`, or train and persist a fresh set
pub fn get_model(dir: &Path, config: &TrainingConfig) -> Result<ModelArtifacts, ModelError> {
    match storage::load_artifacts(dir) {
        Ok(artifacts) => {
            tracing::info!(
                "Loaded model artifacts from {} ({} features)",
                dir.display(),
                artifacts.feature_columns.len()
            );
            Ok(artifacts)
        }
        Err(e) => {
            tracing::warn!("Could not load model artifacts ({}), training a new model", e);
            let artifacts = train(config)?;
            storage::save_artifacts(&artifacts, dir)?;
            tracing::info!("Saved model artifacts to {}", dir.display());
            Ok(artifacts)
        }
    }
}

/// Fit scaler and forest on the synthetic dataset
pub fn train(config: &TrainingConfig) -> Result<ModelArtifacts, ModelError> {
    let dataset = synthetic::generate(config.seed)?;
    let feature_columns = FeatureSchema::from_inputs(dataset.iter().map(|tx| tx.features()));

    let matrix: Vec<Vec<f64>> = dataset
        .iter()
        .map(|tx| feature_columns.encode(&tx.features()))
        .collect();

    let scaler = StandardScaler::fit(&matrix)?;
    let scaled = scaler.transform_all(&matrix)?;

    let params = ForestParams {
        contamination: config.contamination,
        seed: config.seed,
        ..Default::default()
    };
    let model = IsolationForest::fit(&scaled, params)?;

    let flagged = scaled
        .iter()
        .map(|row| model.decision_function(row))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .zip(&dataset)
        .filter(|(score, _)| *score < 0.0)
        .collect::<Vec<_>>();
    let labeled_hits = flagged.iter().filter(|(_, tx)| tx.is_fraud).count();

    tracing::info!(
        "Trained isolation forest: {} rows, {} features, {} flagged ({} labeled fraud)",
        dataset.len(),
        feature_columns.len(),
        flagged.len(),
        labeled_hits
    );

    Ok(ModelArtifacts {
        model,
        scaler,
        feature_columns,
    })
}
