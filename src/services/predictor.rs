//! Per-request train-and-score pipeline.
//!
//! Every call refetches history, rebuilds features, fits a fresh classifier
//! and scores the most recent row. Nothing is cached between calls.

use crate::config::{Config, TrainingMode};
use crate::error::{AppError, Result};
use crate::services::classifier::{Classifier, RandomForestClassifier};
use crate::services::features::{build_features, FeatureSet};
use crate::services::indicators::IndicatorEngine;
use crate::services::{PredictionLedger, SqliteStore};
use crate::sources::MarketDataSource;
use crate::types::{normalize_symbol, Recommendation, RecommendationReport, VolumeTrend};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Scored output for the most recent feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Probability of an uptrend, in percent.
    pub probability_pct: f64,
    pub recommendation: Recommendation,
    pub volume_trend: VolumeTrend,
}

/// Feature rows and labels handed to the classifier.
fn training_set(features: &FeatureSet, mode: TrainingMode) -> (Vec<Vec<f64>>, Vec<u8>) {
    let matrix = features.matrix();
    match mode {
        TrainingMode::FullHistory => (matrix, features.labels.clone()),
        TrainingMode::NextPeriod => {
            let n = matrix.len().saturating_sub(1);
            let x = matrix.into_iter().take(n).collect();
            let y = features.labels.iter().skip(1).copied().collect();
            (x, y)
        }
    }
}

/// Produces buy/do-not-buy recommendations and records them in the ledger.
pub struct Predictor {
    source: Arc<dyn MarketDataSource>,
    classifier: Box<dyn Classifier>,
    ledger: PredictionLedger,
    engine: IndicatorEngine,
    history_period: String,
    training_mode: TrainingMode,
}

impl Predictor {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        classifier: Box<dyn Classifier>,
        ledger: PredictionLedger,
        config: &Config,
    ) -> Self {
        Self {
            source,
            classifier,
            ledger,
            engine: IndicatorEngine::default(),
            history_period: config.history_period.clone(),
            training_mode: config.training_mode,
        }
    }

    /// Wire a predictor with the configured random forest and a ledger over `store`.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn MarketDataSource>,
        store: Arc<SqliteStore>,
    ) -> Self {
        let ledger = PredictionLedger::new(store, source.clone(), config.history_period.clone());
        let classifier = Box::new(RandomForestClassifier::new(config.forest));
        Self::new(source, classifier, ledger, config)
    }

    pub fn ledger(&self) -> &PredictionLedger {
        &self.ledger
    }

    /// Fetch, train and score `symbol` without touching the ledger.
    pub fn predict(&self, symbol: &str) -> Result<Prediction> {
        let bars = match self.source.fetch_history(symbol, &self.history_period) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("History fetch failed for {}: {}", symbol, e);
                return Err(AppError::NoDataAvailable(symbol.to_string()));
            }
        };
        if bars.is_empty() {
            return Err(AppError::NoDataAvailable(symbol.to_string()));
        }

        let features = build_features(&self.engine.compute(&bars));
        let Some(latest) = features.last() else {
            return Err(AppError::InsufficientData(symbol.to_string()));
        };

        let (x, y) = training_set(&features, self.training_mode);
        if x.is_empty() {
            return Err(AppError::InsufficientData(symbol.to_string()));
        }

        debug!(
            "Training {} on {} rows from {} bars ({})",
            symbol,
            x.len(),
            bars.len(),
            self.training_mode.name()
        );

        let model = self.classifier.fit(&x, &y)?;
        let probability_pct = model.predict_probability(&latest.values()) * 100.0;

        Ok(Prediction {
            probability_pct,
            recommendation: Recommendation::from_probability_pct(probability_pct),
            volume_trend: VolumeTrend::from_flag(latest.volume_trend),
        })
    }

    /// Recommend for `symbol` and persist the prediction.
    ///
    /// Never fails: problems are reported through the returned message.
    pub fn recommend(&self, symbol: &str) -> RecommendationReport {
        let symbol = normalize_symbol(symbol);

        let (price, volume) = match self.source.fetch_latest_quote(&symbol) {
            Ok(quote) => (Some(quote.price), Some(quote.volume)),
            Err(e) => {
                warn!("Quote unavailable for {}: {}", symbol, e);
                (None, None)
            }
        };

        let prediction = match self.predict(&symbol) {
            Ok(prediction) => prediction,
            Err(e) => {
                let message = if e.is_data_shortfall() {
                    e.to_string()
                } else {
                    error!("Prediction failed for {}: {}", symbol, e);
                    format!("Prediction failed for {}: {}", symbol, e)
                };
                return RecommendationReport::aborted(symbol, message, price, volume);
            }
        };

        info!(
            "{}: {} ({:.2}% uptrend)",
            symbol, prediction.recommendation, prediction.probability_pct
        );

        if let Err(e) = self
            .ledger
            .store(&symbol, prediction.recommendation, price, volume)
        {
            error!("Failed to store prediction for {}: {}", symbol, e);
        }

        RecommendationReport {
            message: format!(
                "{}: {} (Probability of uptrend: {:.2}%)",
                symbol, prediction.recommendation, prediction.probability_pct
            ),
            symbol,
            price,
            volume,
            volume_trend: Some(prediction.volume_trend),
            recommendation: Some(prediction.recommendation),
            probability: Some(prediction.probability_pct),
        }
    }

    /// Accuracy percentage of stored predictions for `symbol`.
    pub fn accuracy(&self, symbol: &str) -> f64 {
        self.ledger.accuracy(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::features::FeatureRow;
    use chrono::NaiveDate;

    fn feature_set(labels: &[u8]) -> FeatureSet {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, _)| FeatureRow {
                date,
                sma_5: i as f64,
                sma_10: 0.0,
                ema_12: 0.0,
                ema_26: 0.0,
                macd: 0.0,
                signal_line: 0.0,
                bb_upper: 0.0,
                bb_lower: 0.0,
                volume_ma_20: 0.0,
                rsi: 50.0,
                close: 10.0,
                volume_trend: 0.0,
            })
            .collect();
        FeatureSet {
            rows,
            labels: labels.to_vec(),
        }
    }

    #[test]
    fn test_full_history_uses_every_row() {
        let set = feature_set(&[0, 1, 1, 0]);
        let (x, y) = training_set(&set, TrainingMode::FullHistory);
        assert_eq!(x.len(), 4);
        assert_eq!(y, vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_next_period_shifts_labels() {
        let set = feature_set(&[0, 1, 1, 0]);
        let (x, y) = training_set(&set, TrainingMode::NextPeriod);
        assert_eq!(x.len(), 3);
        // Row i is paired with the direction of row i + 1.
        assert_eq!(y, vec![1, 1, 0]);
        assert_eq!(x[2][0], 2.0);
    }

    #[test]
    fn test_next_period_single_row_is_empty() {
        let (x, y) = training_set(&feature_set(&[1]), TrainingMode::NextPeriod);
        assert!(x.is_empty() && y.is_empty());
    }
}
