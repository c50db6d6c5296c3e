//! Market data sources.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::types::{Bar, Quote};

/// Capability to fetch daily price history and the latest quote for a symbol.
pub trait MarketDataSource {
    /// Chronological daily bars covering `period` (e.g. "1y", "6mo", "5d").
    fn fetch_history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>>;

    /// Most recent price and volume. Best-effort: callers treat errors as "unknown".
    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote>;
}
