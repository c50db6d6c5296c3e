//! Stockcast - daily stock direction predictor with an accuracy ledger
//!
//! Fetches daily history, derives technical indicators, trains a fresh
//! classifier per request and records one prediction per symbol per day.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::{Config, TrainingMode};
pub use error::{AppError, Result};
pub use services::{PredictionLedger, Predictor, SqliteStore};
pub use sources::{MarketDataSource, YahooFinanceClient};
