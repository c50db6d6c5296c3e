//! Binary decision tree (Gini impurity).

use super::{validate_training_set, Classifier, TrainedModel};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for feature sampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Fraction of class-1 samples that reached this leaf.
        probability: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// A fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Gini impurity of a node with `positives` class-1 samples out of `total`.
fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

struct TreeBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    labels: &'a [u8],
    max_features: usize,
}

impl<'a> TreeBuilder<'a> {
    fn build(&self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> Node {
        let n = indices.len();
        let positives = indices.iter().filter(|&&i| self.labels[i] == 1).count();
        let leaf = Node::Leaf {
            probability: if n == 0 { 0.5 } else { positives as f64 / n as f64 },
            n_samples: n,
        };

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.config.min_samples_split || positives == 0 || positives == n {
            return leaf;
        }

        let Some(split) = self.find_best_split(indices, positives, rng) else {
            return leaf;
        };

        // Partition in place: values <= threshold go left.
        let mut boundary = 0;
        for k in 0..n {
            if self.features[indices[k]][split.feature] <= split.threshold {
                indices.swap(boundary, k);
                boundary += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(boundary);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left_idx, depth + 1, rng)),
            right: Box::new(self.build(right_idx, depth + 1, rng)),
        }
    }

    /// Sorted sweep over a random subset of features.
    fn find_best_split(
        &self,
        indices: &[usize],
        positives: usize,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let parent = gini(positives, n);

        let mut candidates: Vec<usize> = (0..self.features[0].len()).collect();
        candidates.shuffle(rng);
        candidates.truncate(self.max_features);

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in candidates {
            order.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left_pos = 0;
            for k in 1..n {
                left_pos += usize::from(self.labels[order[k - 1]] == 1);

                let lo = self.features[order[k - 1]][feature];
                let hi = self.features[order[k]][feature];
                if lo == hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let weighted = (k as f64 * gini(left_pos, k)
                    + (n - k) as f64 * gini(positives - left_pos, n - k))
                    / n as f64;
                let gain = parent - weighted;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl DecisionTree {
    /// Fit on the rows selected by `indices` (duplicates allowed, for bootstrap samples).
    pub fn fit_indices(
        config: TreeConfig,
        features: &[Vec<f64>],
        labels: &[u8],
        mut indices: Vec<usize>,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let n_features = validate_training_set(features, labels)?;
        let builder = TreeBuilder {
            config,
            features,
            labels,
            max_features: config.max_features.unwrap_or(n_features).clamp(1, n_features),
        };
        let root = builder.build(&mut indices, 0, rng);
        Ok(Self { root })
    }

    pub fn fit(config: TreeConfig, features: &[Vec<f64>], labels: &[u8]) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::fit_indices(config, features, labels, (0..features.len()).collect(), &mut rng)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    fn leaf_for(&self, row: &[f64]) -> (f64, usize) {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf {
                    probability,
                    n_samples,
                } => return (*probability, *n_samples),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

impl TrainedModel for DecisionTree {
    fn predict_probability(&self, row: &[f64]) -> f64 {
        self.leaf_for(row).0
    }
}

/// A single tree as a `Classifier`.
impl Classifier for TreeConfig {
    fn fit(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<Box<dyn TrainedModel>> {
        Ok(Box::new(DecisionTree::fit(*self, features, labels)?))
    }
}
