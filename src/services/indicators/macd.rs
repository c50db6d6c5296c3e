//! MACD (Moving Average Convergence Divergence).

use super::{Ema, Indicator};

/// MACD line and its signal line.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// MACD indicator.
///
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
#[derive(Debug, Clone, Copy)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    pub fn series(&self, closes: &[f64]) -> MacdSeries {
        let fast = Ema::new(self.fast_period).series(closes);
        let slow = Ema::new(self.slow_period).series(closes);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = Ema::new(self.signal_period).series(&macd);

        MacdSeries {
            fast,
            slow,
            macd,
            signal,
        }
    }
}

impl Indicator for Macd {
    fn lookback(&self) -> usize {
        0
    }
}
