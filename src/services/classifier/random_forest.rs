//! Random Forest classifier.

use super::decision_tree::{DecisionTree, TreeConfig};
use super::{validate_training_set, Classifier, TrainedModel};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Untrained forest: the `Classifier` the predictor fits on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomForestClassifier {
    config: ForestConfig,
}

impl RandomForestClassifier {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Train a forest.
    pub fn train(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<RandomForest> {
        let n_features = validate_training_set(features, labels)?;
        let n_samples = features.len();

        // Default: sqrt of the feature count, rounded down.
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features);

        let mut trees = Vec::with_capacity(self.config.n_trees.max(1));
        for i in 0..self.config.n_trees.max(1) {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(i as u64));
            let indices: Vec<usize> = if self.config.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: Some(max_features),
                seed: self.config.seed.wrapping_add(i as u64),
            };
            trees.push(DecisionTree::fit_indices(
                tree_config,
                features,
                labels,
                indices,
                &mut rng,
            )?);
        }

        debug!(
            "Trained random forest: {} trees on {} samples x {} features",
            trees.len(),
            n_samples,
            n_features
        );

        Ok(RandomForest { trees })
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<Box<dyn TrainedModel>> {
        Ok(Box::new(self.train(features, labels)?))
    }
}

/// A fitted forest. Probability is the mean of the trees' leaf probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TrainedModel for RandomForest {
    fn predict_probability(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees
            .iter()
            .map(|t| t.predict_probability(row))
            .sum::<f64>()
            / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_forest() -> RandomForestClassifier {
        RandomForestClassifier::new(ForestConfig {
            n_trees: 15,
            ..Default::default()
        })
    }

    fn separable(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x = (0..n).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y = (0..n).map(|i| u8::from(i >= n / 2)).collect();
        (x, y)
    }

    #[test]
    fn test_forest_all_up_labels() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, 1.0]).collect();
        let model = small_forest().fit(&x, &[1; 30]).unwrap();
        assert_eq!(model.predict_probability(&[29.0, 1.0]), 1.0);
    }

    #[test]
    fn test_forest_separable() {
        let (x, y) = separable(40);
        let model = small_forest().train(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 15);
        assert!(model.predict_probability(&[39.0, 0.0]) > 0.5);
        assert!(model.predict_probability(&[1.0, 0.0]) < 0.5);
    }

    #[test]
    fn test_forest_probability_range() {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![(i as f64 * 0.37).sin()]).collect();
        let y: Vec<u8> = (0..50).map(|i| ((i * 7) % 3 == 0) as u8).collect();
        let model = small_forest().train(&x, &y).unwrap();
        for row in &x {
            let p = model.predict_probability(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let (x, y) = separable(40);
        let a = small_forest().train(&x, &y).unwrap();
        let b = small_forest().train(&x, &y).unwrap();
        for row in &x {
            assert_eq!(a.predict_probability(row), b.predict_probability(row));
        }
    }

    #[test]
    fn test_forest_rejects_empty() {
        assert!(small_forest().fit(&[], &[]).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ForestConfig::default();
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.seed, 42);
        assert!(config.bootstrap);
    }
}
