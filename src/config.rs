use crate::services::classifier::ForestConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How the predictor lines up labels with feature rows when training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingMode {
    /// Fit every feature row against its own direction, including the row
    /// that is then scored.
    #[default]
    FullHistory,
    /// Fit row `i` against the direction of row `i + 1`; the scored row is
    /// never part of the training set.
    NextPeriod,
}

impl TrainingMode {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full_history" | "full" => Some(Self::FullHistory),
            "next_period" | "next" => Some(Self::NextPeriod),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FullHistory => "full_history",
            Self::NextPeriod => "next_period",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the prediction ledger.
    pub database_path: String,
    /// Range of history fetched per recommendation (e.g. "1y").
    pub history_period: String,
    /// Timeout for market data requests, in seconds.
    pub http_timeout_secs: u64,
    /// Label alignment used when training.
    pub training_mode: TrainingMode,
    /// Random forest hyperparameters.
    pub forest: ForestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "predictions.db".to_string(),
            history_period: "1y".to_string(),
            http_timeout_secs: 30,
            training_mode: TrainingMode::default(),
            forest: ForestConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            history_period: env::var("HISTORY_PERIOD").unwrap_or(defaults.history_period),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout_secs),
            training_mode: env::var("TRAINING_MODE")
                .ok()
                .and_then(|v| TrainingMode::from_str(&v))
                .unwrap_or(defaults.training_mode),
            forest: ForestConfig {
                n_trees: parse_var("FOREST_TREES").unwrap_or(defaults.forest.n_trees),
                max_depth: parse_var("FOREST_MAX_DEPTH").or(defaults.forest.max_depth),
                min_samples_split: parse_var("FOREST_MIN_SAMPLES_SPLIT")
                    .unwrap_or(defaults.forest.min_samples_split),
                min_samples_leaf: parse_var("FOREST_MIN_SAMPLES_LEAF")
                    .unwrap_or(defaults.forest.min_samples_leaf),
                seed: parse_var("FOREST_SEED").unwrap_or(defaults.forest.seed),
                ..defaults.forest
            },
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_path, "predictions.db");
        assert_eq!(config.history_period, "1y");
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.training_mode, TrainingMode::FullHistory);
        assert_eq!(config.forest.n_trees, 100);
    }

    #[test]
    fn test_training_mode_parse() {
        assert_eq!(TrainingMode::from_str("next_period"), Some(TrainingMode::NextPeriod));
        assert_eq!(TrainingMode::from_str(" FULL "), Some(TrainingMode::FullHistory));
        assert_eq!(TrainingMode::from_str("walk_forward"), None);
    }

    #[test]
    fn test_training_mode_name_roundtrip() {
        for mode in [TrainingMode::FullHistory, TrainingMode::NextPeriod] {
            assert_eq!(TrainingMode::from_str(mode.name()), Some(mode));
        }
    }
}
