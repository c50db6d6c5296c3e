use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Convenience constructor for a bar whose OHLC values are all derived from `close`.
    pub fn from_close(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

/// Latest traded price and volume for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub volume: f64,
}

/// Extract the close column of a series.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extract the volume column of a series.
pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Direction of the most recent move: 1 if the last close is above the
/// second-last, else 0. None with fewer than two bars.
pub fn last_move_direction(bars: &[Bar]) -> Option<u8> {
    match bars {
        [.., prev, last] => Some(u8::from(last.close > prev.close)),
        _ => None,
    }
}
