//! Relative Strength Index (RSI).

use super::{Indicator, Sma};

/// RSI (Relative Strength Index) indicator.
///
/// Gains and losses are the positive and negated negative close-to-close
/// changes, zero otherwise. The first bar has no previous close and counts
/// as a zero change. Both are averaged with a plain trailing mean, then
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`.
///
/// A zero average loss would divide by zero: the value is 100 when there
/// were gains and 50 on a completely flat window. A flat window therefore
/// keeps its row instead of yielding NaN and being dropped from the
/// indicator output, which is what a plain `gain / loss` would do.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }

    /// RSI from an average gain and average loss.
    pub fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain > 0.0 { 100.0 } else { 50.0 };
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut gains = Vec::with_capacity(closes.len());
        let mut losses = Vec::with_capacity(closes.len());

        for i in 0..closes.len() {
            let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let window = Sma::new(self.period);
        window
            .series(&gains)
            .into_iter()
            .zip(window.series(&losses))
            .map(|(gain, loss)| Some(Self::from_averages(gain?, loss?)))
            .collect()
    }
}

impl Indicator for Rsi {
    fn lookback(&self) -> usize {
        self.period - 1
    }
}
