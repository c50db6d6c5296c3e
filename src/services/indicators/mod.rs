//! Technical indicator engine.
//!
//! Annotates a daily bar series with a fixed indicator set. Every value at
//! position `t` depends only on bars `0..=t`. Rows where any indicator still
//! lacks lookback are dropped from the output.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{BandSeries, BollingerBands};
pub use ema::Ema;
pub use macd::{Macd, MacdSeries};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::types::{closes, volumes, Bar};
use serde::{Deserialize, Serialize};

/// Warm-up requirement shared by the indicators.
pub trait Indicator {
    /// Number of preceding bars needed before the first value exists.
    fn lookback(&self) -> usize;
}

/// A bar annotated with every indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: Bar,
    pub sma_5: f64,
    pub sma_10: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub macd: f64,
    pub signal_line: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub volume_ma_20: f64,
    pub rsi: f64,
}

/// Indicator set used by the predictor.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorEngine {
    sma_fast: Sma,
    sma_slow: Sma,
    macd: Macd,
    bands: BollingerBands,
    volume_ma: Sma,
    rsi: Rsi,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            sma_fast: Sma::new(5),
            sma_slow: Sma::new(10),
            macd: Macd::default(),
            bands: BollingerBands::default(),
            volume_ma: Sma::new(20),
            rsi: Rsi::default(),
        }
    }
}

impl IndicatorEngine {
    /// Bars that are always dropped from the front of the output.
    pub fn warmup(&self) -> usize {
        [
            self.sma_fast.lookback(),
            self.sma_slow.lookback(),
            self.macd.lookback(),
            self.bands.lookback(),
            self.volume_ma.lookback(),
            self.rsi.lookback(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn compute(&self, bars: &[Bar]) -> Vec<IndicatorRow> {
        let close = closes(bars);
        let volume = volumes(bars);

        let sma_fast = self.sma_fast.series(&close);
        let sma_slow = self.sma_slow.series(&close);
        let macd = self.macd.series(&close);
        let bands = self.bands.series(&close);
        let volume_ma = self.volume_ma.series(&volume);
        let rsi = self.rsi.series(&close);

        bars.iter()
            .enumerate()
            .filter_map(|(i, bar)| {
                let row = IndicatorRow {
                    bar: bar.clone(),
                    sma_5: sma_fast[i]?,
                    sma_10: sma_slow[i]?,
                    ema_12: macd.fast[i],
                    ema_26: macd.slow[i],
                    macd: macd.macd[i],
                    signal_line: macd.signal[i],
                    bb_middle: bands.middle[i]?,
                    bb_upper: bands.upper[i]?,
                    bb_lower: bands.lower[i]?,
                    volume_ma_20: volume_ma[i]?,
                    rsi: rsi[i]?,
                };
                row.is_finite().then_some(row)
            })
            .collect()
    }
}

impl IndicatorRow {
    fn is_finite(&self) -> bool {
        [
            self.sma_5,
            self.sma_10,
            self.ema_12,
            self.ema_26,
            self.macd,
            self.signal_line,
            self.bb_middle,
            self.bb_upper,
            self.bb_lower,
            self.volume_ma_20,
            self.rsi,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Annotate `bars` with the default indicator set.
pub fn compute_indicators(bars: &[Bar]) -> Vec<IndicatorRow> {
    IndicatorEngine::default().compute(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + Duration::days(i as i64),
                open: c - 0.5,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1_000.0 + (i % 7) as f64 * 150.0,
            })
            .collect()
    }

    fn wavy(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + i as f64 * 0.3 + (i as f64 * 0.8).sin() * 4.0)
            .collect()
    }

    #[test]
    fn test_warmup_is_twenty_bar_window() {
        assert_eq!(IndicatorEngine::default().warmup(), 19);
    }

    #[test]
    fn test_rows_dropped_for_lookback() {
        let bars = series(&wavy(30));
        let rows = compute_indicators(&bars);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0].bar.date, bars[19].date);
    }

    #[test]
    fn test_too_short_is_empty() {
        assert!(compute_indicators(&series(&wavy(19))).is_empty());
        assert!(compute_indicators(&[]).is_empty());
    }

    #[test]
    fn test_no_nan_in_retained_rows() {
        for row in compute_indicators(&series(&wavy(60))) {
            assert!(row.is_finite());
        }
    }

    #[test]
    fn test_sma_5_is_trailing_mean() {
        let closes = wavy(40);
        let bars = series(&closes);
        let rows = compute_indicators(&bars);
        for (offset, row) in rows.iter().enumerate() {
            let i = offset + 19;
            let expected = closes[i - 4..=i].iter().sum::<f64>() / 5.0;
            assert!((row.sma_5 - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_macd_identity() {
        for row in compute_indicators(&series(&wavy(50))) {
            assert_eq!(row.macd, row.ema_12 - row.ema_26);
        }
    }

    #[test]
    fn test_rsi_bounds() {
        for row in compute_indicators(&series(&wavy(80))) {
            assert!(row.rsi >= 0.0 && row.rsi <= 100.0);
        }
    }

    #[test]
    fn test_flat_series_keeps_rows_with_neutral_rsi() {
        let rows = compute_indicators(&series(&[42.0; 30]));
        assert_eq!(rows.len(), 11);
        assert!(rows.iter().all(|row| row.rsi == 50.0));
    }

    #[test]
    fn test_no_look_ahead() {
        let closes = wavy(45);
        let full = compute_indicators(&series(&closes));
        let truncated = compute_indicators(&series(&closes[..30]));
        assert_eq!(&full[..truncated.len()], &truncated[..]);
    }
}
