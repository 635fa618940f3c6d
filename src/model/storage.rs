use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{FeatureSchema, IsolationForest, ModelArtifacts, ModelError, StandardScaler};

pub const MODEL_FILE: &str = "fraud_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const COLUMNS_FILE: &str = "model_columns.json";

/// Write all three artifacts, overwriting any previous set
pub fn save_artifacts(artifacts: &ModelArtifacts, dir: &Path) -> Result<(), ModelError> {
    fs::create_dir_all(dir)?;

    write_json(&dir.join(COLUMNS_FILE), &artifacts.feature_columns)?;
    write_json(&dir.join(MODEL_FILE), &artifacts.model)?;
    write_json(&dir.join(SCALER_FILE), &artifacts.scaler)?;
    Ok(())
}

/// Load a previously saved set, rejecting sets whose widths disagree
pub fn load_artifacts(dir: &Path) -> Result<ModelArtifacts, ModelError> {
    let model: IsolationForest = read_json(&dir.join(MODEL_FILE))?;
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
    let feature_columns: FeatureSchema = read_json(&dir.join(COLUMNS_FILE))?;

    let artifacts = ModelArtifacts {
        model,
        scaler,
        feature_columns,
    };
    artifacts.validate()?;
    Ok(artifacts)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{train, TrainingConfig};
    use serde_json::{json, Value};

    /// Save a trained set, then rewrite one artifact file in place
    fn saved_with_edit(file: &str, edit: impl FnOnce(&mut Value)) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = train(&TrainingConfig::default()).unwrap();
        save_artifacts(&artifacts, dir.path()).unwrap();

        let path = dir.path().join(file);
        let mut value: Value = read_json(&path).unwrap();
        edit(&mut value);
        write_json(&path, &value).unwrap();
        dir
    }

    #[test]
    fn test_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let original = train(&TrainingConfig::default()).unwrap();

        save_artifacts(&original, dir.path()).unwrap();
        let loaded = load_artifacts(dir.path()).unwrap();

        assert_eq!(loaded.feature_columns, original.feature_columns);
        assert_eq!(loaded.scaler, original.scaler);
        assert_eq!(loaded.model.offset, original.model.offset);

        let probe = original.feature_columns.len();
        let row = vec![0.5; probe];
        assert_eq!(
            loaded.model.decision_function(&row).unwrap(),
            original.model.decision_function(&row).unwrap()
        );
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::Io(_))));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = train(&TrainingConfig::default()).unwrap();
        save_artifacts(&artifacts, dir.path()).unwrap();
        fs::write(dir.path().join(SCALER_FILE), b"not json").unwrap();

        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::Serialization(_))));
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = train(&TrainingConfig::default()).unwrap();
        save_artifacts(&artifacts, dir.path()).unwrap();
        write_json(
            &dir.path().join(COLUMNS_FILE),
            &FeatureSchema::new(vec!["amount".to_string()]),
        )
        .unwrap();

        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_forest_rejected() {
        let dir = saved_with_edit(MODEL_FILE, |v| v["trees"] = json!([]));
        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let dir = saved_with_edit(MODEL_FILE, |v| v["sample_size"] = json!(0));
        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_out_of_range_split_rejected() {
        let dir = saved_with_edit(MODEL_FILE, |v| {
            assert_eq!(v["trees"][0]["kind"], "split");
            v["trees"][0]["feature"] = json!(99);
        });
        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_offset_rejected() {
        let dir = saved_with_edit(MODEL_FILE, |v| v["offset"] = Value::Null);
        assert!(load_artifacts(dir.path()).is_err());
    }

    #[test]
    fn test_short_scale_rejected() {
        let dir = saved_with_edit(SCALER_FILE, |v| {
            v["scale"].as_array_mut().unwrap().pop();
        });
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ModelError::ShapeMismatch { expected: 10, actual: 9 })
        ));
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let dir = saved_with_edit(SCALER_FILE, |v| v["scale"][0] = json!(-1.0));
        assert!(matches!(load_artifacts(dir.path()), Err(ModelError::InvalidConfig(_))));
    }
}
