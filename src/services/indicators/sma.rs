//! Simple Moving Average (SMA).

use super::Indicator;

/// SMA (Simple Moving Average) over a trailing window.
///
/// The first `period - 1` positions have no value.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }

    /// Trailing mean at every position with a full window.
    pub fn series(&self, values: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < self.period {
            return out;
        }

        for end in self.period..=values.len() {
            let window = &values[end - self.period..end];
            out[end - 1] = Some(window.iter().sum::<f64>() / self.period as f64);
        }

        out
    }
}

impl Indicator for Sma {
    fn lookback(&self) -> usize {
        self.period - 1
    }
}
