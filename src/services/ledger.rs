//! Prediction ledger: at most one stored prediction per symbol per day,
//! scored against the latest observed move, with per-symbol accuracy.

use crate::error::{AppError, Result};
use crate::services::SqliteStore;
use crate::sources::MarketDataSource;
use crate::types::{
    last_move_direction, normalize_symbol, AccuracyStats, NewPrediction, PredictionRecord,
    Recommendation, StoreOutcome,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Records predictions and reports their accuracy.
pub struct PredictionLedger {
    store: Arc<SqliteStore>,
    source: Arc<dyn MarketDataSource>,
    history_period: String,
}

impl PredictionLedger {
    pub fn new(
        store: Arc<SqliteStore>,
        source: Arc<dyn MarketDataSource>,
        history_period: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            history_period: history_period.into(),
        }
    }

    /// Direction of the most recent close-to-close move, refetched from the source.
    pub fn actual_direction(&self, symbol: &str) -> Result<u8> {
        let bars = self.source.fetch_history(symbol, &self.history_period)?;
        last_move_direction(&bars)
            .ok_or_else(|| AppError::NotEnoughHistoryForActual(symbol.to_string()))
    }

    /// Store today's prediction for `symbol` (local calendar date).
    pub fn store(
        &self,
        symbol: &str,
        recommendation: Recommendation,
        price: Option<f64>,
        volume: Option<f64>,
    ) -> Result<StoreOutcome> {
        self.store_for_date(Local::now().date_naive(), symbol, recommendation, price, volume)
    }

    /// Store a prediction for `symbol` on `date` unless one already exists.
    ///
    /// A missing actual direction is stored as NULL and scores as incorrect.
    pub fn store_for_date(
        &self,
        date: NaiveDate,
        symbol: &str,
        recommendation: Recommendation,
        price: Option<f64>,
        volume: Option<f64>,
    ) -> Result<StoreOutcome> {
        let symbol = normalize_symbol(symbol);

        let actual_direction = match self.actual_direction(&symbol) {
            Ok(direction) => Some(direction),
            Err(e) => {
                warn!("Actual direction unknown for {}: {}", symbol, e);
                None
            }
        };

        let prediction = NewPrediction {
            symbol,
            date,
            recommendation,
            actual_direction,
            price,
            volume,
        };

        let outcome = self.store.insert_if_absent(&prediction)?;
        match outcome {
            StoreOutcome::Inserted(id) => debug!(
                "Recorded {} for {} on {} (id {}, actual {:?})",
                recommendation, prediction.symbol, date, id, actual_direction
            ),
            StoreOutcome::Skipped => info!(
                "Prediction already exists for {} on {}. Skipping...",
                prediction.symbol, date
            ),
        }
        Ok(outcome)
    }

    pub fn accuracy_stats(&self, symbol: &str) -> Result<AccuracyStats> {
        self.store.accuracy_stats(&normalize_symbol(symbol))
    }

    /// Percentage of correct predictions for `symbol`; 0.0 with no records.
    ///
    /// Storage errors are logged and reported as 0.0.
    pub fn accuracy(&self, symbol: &str) -> f64 {
        match self.accuracy_stats(symbol) {
            Ok(stats) => stats.accuracy_pct(),
            Err(e) => {
                error!("Failed to read accuracy for {}: {}", symbol, e);
                0.0
            }
        }
    }

    /// Most recent records for `symbol`.
    pub fn history(&self, symbol: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        self.store.predictions(&normalize_symbol(symbol), limit)
    }
}
