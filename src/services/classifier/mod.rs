//! Classifier capability used by the predictor.
//!
//! `Classifier::fit` produces a fresh model per call; nothing is kept
//! between requests.

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig};
pub use random_forest::{ForestConfig, RandomForest, RandomForestClassifier};

use crate::error::{AppError, Result};

/// Trains binary classifiers.
pub trait Classifier {
    /// Fit a model on row-aligned features and 0/1 labels.
    fn fit(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<Box<dyn TrainedModel>>;
}

/// A fitted binary classifier.
pub trait TrainedModel {
    /// Probability that `row` belongs to class 1, in `[0, 1]`.
    fn predict_probability(&self, row: &[f64]) -> f64;
}

/// Reject training sets the tree learners cannot use.
pub(crate) fn validate_training_set(features: &[Vec<f64>], labels: &[u8]) -> Result<usize> {
    if features.is_empty() {
        return Err(AppError::Internal("cannot fit on an empty training set".into()));
    }
    if features.len() != labels.len() {
        return Err(AppError::Internal(format!(
            "feature rows ({}) and labels ({}) differ in length",
            features.len(),
            labels.len()
        )));
    }
    let width = features[0].len();
    if width == 0 || features.iter().any(|row| row.len() != width) {
        return Err(AppError::Internal("feature rows must share a non-zero width".into()));
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(AppError::Internal(format!("label {} is not binary", bad)));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty() {
        assert!(validate_training_set(&[], &[]).is_err());
    }

    #[test]
    fn test_validate_rejects_misaligned() {
        let x = vec![vec![1.0], vec![2.0]];
        assert!(validate_training_set(&x, &[1]).is_err());
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let x = vec![vec![1.0, 2.0], vec![2.0]];
        assert!(validate_training_set(&x, &[1, 0]).is_err());
    }

    #[test]
    fn test_validate_rejects_non_binary_labels() {
        let x = vec![vec![1.0], vec![2.0]];
        assert!(validate_training_set(&x, &[1, 2]).is_err());
    }

    #[test]
    fn test_validate_returns_width() {
        let x = vec![vec![1.0, 2.0, 3.0]];
        assert_eq!(validate_training_set(&x, &[0]).unwrap(), 3);
    }
}
