use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No data available for {0}.")]
    NoDataAvailable(String),

    #[error("Insufficient data for {0}.")]
    InsufficientData(String),

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Not enough data for {0}.")]
    NotEnoughHistoryForActual(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the error means the request could not produce a prediction
    /// because of the shape of the data, rather than a failure of a collaborator.
    pub fn is_data_shortfall(&self) -> bool {
        matches!(
            self,
            AppError::NoDataAvailable(_)
                | AppError::InsufficientData(_)
                | AppError::NotEnoughHistoryForActual(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_messages() {
        assert_eq!(
            AppError::NoDataAvailable("AAPL".into()).to_string(),
            "No data available for AAPL."
        );
        assert_eq!(
            AppError::InsufficientData("SHORT".into()).to_string(),
            "Insufficient data for SHORT."
        );
    }

    #[test]
    fn test_data_shortfall() {
        assert!(AppError::InsufficientData("X".into()).is_data_shortfall());
        assert!(!AppError::ExternalApi("503".into()).is_data_shortfall());
    }
}
