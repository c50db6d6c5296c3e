//! Exponential Moving Average (EMA).

use super::Indicator;

/// EMA with smoothing factor `2 / (span + 1)`.
///
/// Seeded with the first observation rather than an SMA, so every
/// position has a value:
/// `ema[0] = x[0]`, `ema[t] = alpha * x[t] + (1 - alpha) * ema[t - 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self { span: span.max(1) }
    }

    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    pub fn series(&self, values: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(values.len());

        for &value in values {
            let next = match out.last() {
                Some(&prev) => alpha * value + (1.0 - alpha) * prev,
                None => value,
            };
            out.push(next);
        }

        out
    }
}

impl Indicator for Ema {
    fn lookback(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeded_with_first_value() {
        let ema = Ema::new(3);
        let out = ema.series(&[10.0, 20.0, 30.0]);
        // alpha = 0.5
        assert_eq!(out[0], 10.0);
        assert!((out[1] - 15.0).abs() < 1e-12);
        assert!((out[2] - 22.5).abs() < 1e-12);
    }

    #[test]
    fn test_ema_constant_series() {
        let ema = Ema::new(12);
        let out = ema.series(&[5.0; 30]);
        assert!(out.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_ema_empty() {
        assert!(Ema::new(12).series(&[]).is_empty());
    }

    #[test]
    fn test_ema_alpha() {
        assert!((Ema::new(12).alpha() - 2.0 / 13.0).abs() < 1e-12);
    }
}
