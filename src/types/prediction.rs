use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical ledger key for a ticker symbol: trimmed and uppercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Binary recommendation derived from the uptrend probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Do not buy")]
    DoNotBuy,
}

impl Recommendation {
    /// Buy iff the uptrend probability (in percent) is strictly above 50.
    pub fn from_probability_pct(probability_pct: f64) -> Self {
        if probability_pct > 50.0 {
            Self::Buy
        } else {
            Self::DoNotBuy
        }
    }

    /// Label stored in the ledger's `predicted_direction` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::DoNotBuy => "Do not buy",
        }
    }

    /// Parse a stored label. Anything starting with "Buy" is a buy.
    pub fn from_label(label: &str) -> Self {
        if label.starts_with("Buy") {
            Self::Buy
        } else {
            Self::DoNotBuy
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of volume on the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

impl VolumeTrend {
    pub fn from_flag(flag: f64) -> Self {
        if flag == 1.0 {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "Increasing",
            Self::Decreasing => "Decreasing",
        }
    }
}

impl fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a recommendation request.
///
/// Always carries a human-readable `message`, including when the request
/// aborted early; the optional fields are only filled as far as the pipeline got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub symbol: String,
    pub message: String,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub volume_trend: Option<VolumeTrend>,
    pub recommendation: Option<Recommendation>,
    /// Probability of an uptrend, in percent.
    pub probability: Option<f64>,
}

impl RecommendationReport {
    /// Report for a request that stopped before a prediction was made.
    pub fn aborted(
        symbol: impl Into<String>,
        message: impl Into<String>,
        price: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            message: message.into(),
            price,
            volume,
            volume_trend: None,
            recommendation: None,
            probability: None,
        }
    }

    pub fn is_prediction(&self) -> bool {
        self.recommendation.is_some()
    }
}

/// A persisted prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: i64,
    pub symbol: String,
    pub date: NaiveDate,
    pub predicted_direction: String,
    pub actual_direction: Option<u8>,
    pub correct: u8,
    pub price: Option<f64>,
    pub volume: Option<f64>,
}

/// Values written for a new ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub symbol: String,
    pub date: NaiveDate,
    pub recommendation: Recommendation,
    pub actual_direction: Option<u8>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
}

impl NewPrediction {
    /// Only a buy followed by an up move scores as correct.
    pub fn correct(&self) -> u8 {
        u8::from(self.recommendation.is_buy() && self.actual_direction == Some(1))
    }
}

/// What `store` did with a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// New row written with this id.
    Inserted(i64),
    /// A row for the same symbol and day already existed.
    Skipped,
}

/// Counts behind a symbol's accuracy percentage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub total: i64,
    pub correct: i64,
}

impl AccuracyStats {
    /// Correct / total * 100, or 0.0 with no records.
    pub fn accuracy_pct(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl "), "AAPL");
        assert_eq!(normalize_symbol("BRK.B"), "BRK.B");
    }

    #[test]
    fn test_recommendation_threshold() {
        assert_eq!(Recommendation::from_probability_pct(50.01), Recommendation::Buy);
        assert_eq!(Recommendation::from_probability_pct(50.0), Recommendation::DoNotBuy);
        assert_eq!(Recommendation::from_probability_pct(0.0), Recommendation::DoNotBuy);
    }

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(Recommendation::Buy.to_string(), "Buy");
        assert_eq!(Recommendation::DoNotBuy.to_string(), "Do not buy");
        assert_eq!(Recommendation::from_label("Buy"), Recommendation::Buy);
        assert_eq!(Recommendation::from_label("Do not buy"), Recommendation::DoNotBuy);
    }

    #[test]
    fn test_recommendation_serde_uses_labels() {
        let json = serde_json::to_string(&Recommendation::DoNotBuy).unwrap();
        assert_eq!(json, "\"Do not buy\"");
    }

    #[test]
    fn test_correct_requires_buy_and_up_move() {
        let mut p = NewPrediction {
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            recommendation: Recommendation::Buy,
            actual_direction: Some(1),
            price: None,
            volume: None,
        };
        assert_eq!(p.correct(), 1);

        p.actual_direction = Some(0);
        assert_eq!(p.correct(), 0);

        p.actual_direction = None;
        assert_eq!(p.correct(), 0);

        // A "Do not buy" before a down move is still scored as incorrect.
        p.recommendation = Recommendation::DoNotBuy;
        p.actual_direction = Some(0);
        assert_eq!(p.correct(), 0);
    }

    #[test]
    fn test_accuracy_pct() {
        assert_eq!(AccuracyStats::default().accuracy_pct(), 0.0);
        let stats = AccuracyStats { total: 4, correct: 3 };
        assert!((stats.accuracy_pct() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_trend_from_flag() {
        assert_eq!(VolumeTrend::from_flag(1.0), VolumeTrend::Increasing);
        assert_eq!(VolumeTrend::from_flag(0.0), VolumeTrend::Decreasing);
    }
}
