//! Bollinger Bands.

use super::{Indicator, Sma};

/// Middle, upper and lower band series. Positions without a full window are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSeries {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the sample standard deviation (n - 1) of the same window.
#[derive(Debug, Clone, Copy)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period: period.max(2),
            std_dev_multiplier,
        }
    }

    /// Sample standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        variance.sqrt()
    }

    pub fn series(&self, closes: &[f64]) -> BandSeries {
        let middle = Sma::new(self.period).series(closes);
        let mut upper = vec![None; closes.len()];
        let mut lower = vec![None; closes.len()];

        for (i, mean) in middle.iter().enumerate() {
            let Some(mean) = *mean else { continue };
            let window = &closes[i + 1 - self.period..=i];
            let width = self.std_dev_multiplier * Self::std_dev(window, mean);
            upper[i] = Some(mean + width);
            lower[i] = Some(mean - width);
        }

        BandSeries {
            middle,
            upper,
            lower,
        }
    }
}

impl Indicator for BollingerBands {
    fn lookback(&self) -> usize {
        self.period - 1
    }
}
