//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use stockcast::services::classifier::{
    Classifier, ForestConfig, RandomForestClassifier, TrainedModel,
};
use stockcast::types::{Bar, Quote};
use stockcast::{AppError, Config, MarketDataSource, PredictionLedger, Predictor, Result, SqliteStore};

/// In-process market data keyed by symbol.
#[derive(Default)]
pub struct FakeSource {
    pub history: HashMap<String, Vec<Bar>>,
    pub quotes: HashMap<String, Quote>,
    pub history_calls: Cell<usize>,
    pub quote_calls: Cell<usize>,
}

impl FakeSource {
    pub fn with_history(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.history.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_quote(mut self, symbol: &str, price: f64, volume: f64) -> Self {
        self.quotes.insert(symbol.to_string(), Quote { price, volume });
        self
    }
}

impl MarketDataSource for FakeSource {
    fn fetch_history(&self, symbol: &str, _period: &str) -> Result<Vec<Bar>> {
        self.history_calls.set(self.history_calls.get() + 1);
        Ok(self.history.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote> {
        self.quote_calls.set(self.quote_calls.get() + 1);
        self.quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| AppError::QuoteUnavailable(symbol.to_string()))
    }
}

/// Source whose every request fails.
pub struct DownSource;

impl MarketDataSource for DownSource {
    fn fetch_history(&self, _symbol: &str, _period: &str) -> Result<Vec<Bar>> {
        Err(AppError::ExternalApi("503 Service Unavailable".into()))
    }

    fn fetch_latest_quote(&self, _symbol: &str) -> Result<Quote> {
        Err(AppError::ExternalApi("503 Service Unavailable".into()))
    }
}

/// Random forest that counts how often it was fitted.
pub struct CountingClassifier {
    inner: RandomForestClassifier,
    pub fits: Rc<Cell<usize>>,
}

impl CountingClassifier {
    pub fn new() -> (Self, Rc<Cell<usize>>) {
        let fits = Rc::new(Cell::new(0));
        let classifier = Self {
            inner: RandomForestClassifier::new(test_forest()),
            fits: fits.clone(),
        };
        (classifier, fits)
    }
}

impl Classifier for CountingClassifier {
    fn fit(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<Box<dyn TrainedModel>> {
        self.fits.set(self.fits.get() + 1);
        self.inner.fit(features, labels)
    }
}

/// Classifier that refuses to train.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn fit(&self, _features: &[Vec<f64>], _labels: &[u8]) -> Result<Box<dyn TrainedModel>> {
        Err(AppError::Internal("solver diverged".into()))
    }
}

pub fn test_forest() -> ForestConfig {
    ForestConfig {
        n_trees: 10,
        ..Default::default()
    }
}

pub fn test_config() -> Config {
    Config {
        forest: test_forest(),
        ..Config::default()
    }
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

/// Daily bars built from closes and volumes.
pub fn bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            date: start() + Duration::days(i as i64),
            open: close - 0.4,
            high: close + 0.8,
            low: close - 0.9,
            close,
            volume,
        })
        .collect()
}

/// Strictly rising closes with rising volume.
pub fn rising(days: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..days).map(|i| 100.0 + i as f64 * 1.25).collect();
    let volumes: Vec<f64> = (0..days).map(|i| 1_000_000.0 + i as f64 * 10_000.0).collect();
    bars(&closes, &volumes)
}

/// Strictly falling closes with falling volume.
pub fn falling(days: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..days).map(|i| 200.0 - i as f64 * 1.25).collect();
    let volumes: Vec<f64> = (0..days).map(|i| 2_000_000.0 - i as f64 * 10_000.0).collect();
    bars(&closes, &volumes)
}

/// Predictor over `source` with a counting classifier and an in-memory ledger.
pub fn predictor_with(
    source: Arc<FakeSource>,
    config: &Config,
) -> (Predictor, Arc<SqliteStore>, Rc<Cell<usize>>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let ledger = PredictionLedger::new(store.clone(), source.clone(), config.history_period.clone());
    let (classifier, fits) = CountingClassifier::new();
    let predictor = Predictor::new(source, Box::new(classifier), ledger, config);
    (predictor, store, fits)
}
