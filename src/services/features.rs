//! Feature matrix and direction labels built from indicator rows.

use crate::services::indicators::IndicatorRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Model input columns, in matrix order.
pub const FEATURE_NAMES: [&str; 12] = [
    "SMA_5",
    "SMA_10",
    "EMA_12",
    "EMA_26",
    "MACD",
    "Signal_Line",
    "BB_Upper",
    "BB_Lower",
    "Volume_MA_20",
    "RSI",
    "Close",
    "Volume_Trend",
];

/// One model input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub sma_5: f64,
    pub sma_10: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub macd: f64,
    pub signal_line: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub volume_ma_20: f64,
    pub rsi: f64,
    pub close: f64,
    /// 1.0 if volume rose against the previous bar, else 0.0.
    pub volume_trend: f64,
}

impl FeatureRow {
    /// Values in `FEATURE_NAMES` order.
    pub fn values(&self) -> Vec<f64> {
        vec![
            self.sma_5,
            self.sma_10,
            self.ema_12,
            self.ema_26,
            self.macd,
            self.signal_line,
            self.bb_upper,
            self.bb_lower,
            self.volume_ma_20,
            self.rsi,
            self.close,
            self.volume_trend,
        ]
    }
}

/// Row-aligned features and labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub rows: Vec<FeatureRow>,
    /// Direction: 1 if the close rose against the previous bar, else 0.
    pub labels: Vec<u8>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature matrix, one `Vec` per row.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::values).collect()
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }
}

/// Percent change from `prev` to `current`; None when undefined.
fn pct_change(prev: f64, current: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    let change = (current - prev) / prev;
    change.is_finite().then_some(change)
}

/// Build features and labels from indicator rows.
///
/// The first row has no previous bar to compare against and is dropped,
/// as is any row whose return is undefined.
pub fn build_features(rows: &[IndicatorRow]) -> FeatureSet {
    let mut set = FeatureSet::default();

    for pair in rows.windows(2) {
        let (prev, row) = (&pair[0], &pair[1]);
        let Some(ret) = pct_change(prev.bar.close, row.bar.close) else {
            continue;
        };

        set.rows.push(FeatureRow {
            date: row.bar.date,
            sma_5: row.sma_5,
            sma_10: row.sma_10,
            ema_12: row.ema_12,
            ema_26: row.ema_26,
            macd: row.macd,
            signal_line: row.signal_line,
            bb_upper: row.bb_upper,
            bb_lower: row.bb_lower,
            volume_ma_20: row.volume_ma_20,
            rsi: row.rsi,
            close: row.bar.close,
            volume_trend: if row.bar.volume > prev.bar.volume { 1.0 } else { 0.0 },
        });
        set.labels.push(u8::from(ret > 0.0));
    }

    set
}
