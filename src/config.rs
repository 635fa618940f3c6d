//! Configuration module

use std::env;
use std::str::FromStr;
use std::path::PathBuf;

use crate::model::{detector::DEFAULT_THRESHOLD, TrainingConfig};
use crate::models::DEFAULT_RECENT_LIMIT;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub model_dir: PathBuf,

    /// Anomaly scores below this are flagged
    pub fraud_threshold: f64,

    /// Expected outlier fraction when training
    pub contamination: f64,

    /// Seed for synthetic data and the forest
    pub training_seed: u64,

    /// Page polling interval in seconds
    pub dashboard_refresh_secs: u64,

    /// Rows shown in the recent transactions table
    pub recent_limit: usize,

    /// Log format (pretty, json)
    pub log_format: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://transactions.db".to_string(),
            port: 5000,
            model_dir: PathBuf::from("."),
            fraud_threshold: DEFAULT_THRESHOLD,
            contamination: 0.05,
            training_seed: 42,
            dashboard_refresh_secs: 10,
            recent_limit: DEFAULT_RECENT_LIMIT,
            log_format: "pretty".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse(lookup("PORT")).unwrap_or(defaults.port),
            model_dir: lookup("MODEL_DIR").map(PathBuf::from).unwrap_or(defaults.model_dir),
            fraud_threshold: parse(lookup("FRAUD_THRESHOLD")).unwrap_or(defaults.fraud_threshold),
            contamination: parse(lookup("CONTAMINATION")).unwrap_or(defaults.contamination),
            training_seed: parse(lookup("TRAINING_SEED")).unwrap_or(defaults.training_seed),
            dashboard_refresh_secs: parse(lookup("DASHBOARD_REFRESH_SECS"))
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.dashboard_refresh_secs),
            recent_limit: parse(lookup("RECENT_LIMIT")).unwrap_or(defaults.recent_limit),
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    pub fn training(&self) -> TrainingConfig {
        TrainingConfig {
            contamination: self.contamination,
            seed: self.training_seed,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.port, 5000);
        assert_eq!(config.fraud_threshold, -0.1);
        assert_eq!(config.dashboard_refresh_secs, 10);
        assert_eq!(config.recent_limit, 10);
        assert_eq!(config.database_url, "sqlite://transactions.db");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8081"),
            ("FRAUD_THRESHOLD", "-0.25"),
            ("TRAINING_SEED", "not-a-number"),
            ("DASHBOARD_REFRESH_SECS", "0"),
            ("ENVIRONMENT", "production"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.port, 8081);
        assert_eq!(config.fraud_threshold, -0.25);
        assert_eq!(config.training_seed, 42);
        assert_eq!(config.dashboard_refresh_secs, 10);
        assert!(config.is_production());
    }
}
