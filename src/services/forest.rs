//! Random forest binary classifier.
//!
//! Bagged CART trees split on Gini impurity, with a random subset of
//! features considered at each node. All randomness comes from a single
//! seeded `StdRng`, so a fit is reproducible for a given seed.

use crate::error::{AppError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Forest hyperparameters.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        prob_up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single fitted tree, stored as a node arena rooted at index 0.
#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn predict_proba(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { prob_up } => return *prob_up,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(up: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = up as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    params: &'a ForestParams,
    max_features: usize,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, samples: Vec<usize>, rng: &mut StdRng) -> DecisionTree {
        self.grow(samples, 0, rng);
        DecisionTree { nodes: self.nodes }
    }

    /// Grow the subtree for `samples` and return its node index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let total = samples.len();
        let up = samples.iter().filter(|&&i| self.y[i]).count();
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            prob_up: if total == 0 { 0.0 } else { up as f64 / total as f64 },
        });

        let depth_reached = self.params.max_depth.map(|d| depth >= d).unwrap_or(false);
        if total < self.params.min_samples_split || up == 0 || up == total || depth_reached {
            return idx;
        }

        let Some(split) = self.best_split(&samples, up, rng) else {
            return idx;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);

        let left_idx = self.grow(left, depth + 1, rng);
        let right_idx = self.grow(right, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
        };
        idx
    }

    fn best_split(&self, samples: &[usize], up: usize, rng: &mut StdRng) -> Option<BestSplit> {
        let n_features = self.x.first().map(|r| r.len()).unwrap_or(0);
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(rng);

        let parent = gini(up, samples.len());
        let mut best: Option<BestSplit> = None;
        let mut evaluated = 0usize;

        for feature in order {
            // Constant features don't count toward the per-node budget.
            if evaluated >= self.max_features && best.is_some() {
                break;
            }

            let mut column: Vec<(f64, bool)> = samples
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column.first().map(|c| c.0) == column.last().map(|c| c.0) {
                continue;
            }
            evaluated += 1;

            let total = column.len();
            let mut left_up = 0usize;
            for i in 0..total - 1 {
                if column[i].1 {
                    left_up += 1;
                }
                let (value, next) = (column[i].0, column[i + 1].0);
                if value >= next {
                    continue;
                }

                let left_n = i + 1;
                let right_n = total - left_n;
                let impurity = (left_n as f64 * gini(left_up, left_n)
                    + right_n as f64 * gini(up - left_up, right_n))
                    / total as f64;

                if impurity < parent && best.as_ref().map(|b| impurity < b.impurity).unwrap_or(true) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }
}

/// Ensemble of bootstrapped decision trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit a forest on rows `x` with binary labels `y`.
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            return Err(AppError::Prediction("no training rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(AppError::Prediction(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|r| r.len() != n_features) {
            return Err(AppError::Prediction("ragged or empty feature rows".to_string()));
        }

        let max_features = params
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = x.len();
        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                let samples: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
                TreeBuilder {
                    x,
                    y,
                    params,
                    max_features,
                    nodes: Vec::new(),
                }
                .build(samples, &mut tree_rng)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    /// Mean probability of the "up" class across trees.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Predicted class; an even vote resolves to "down".
    pub fn predict(&self, features: &[f64]) -> bool {
        self.predict_proba(features) > 0.5
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Deepest tree in the ensemble.
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable(n: usize) -> (Vec<Vec<f64>>, Vec<bool>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<bool> = (0..n).map(|i| i >= n / 2).collect();
        (x, y)
    }

    #[test]
    fn test_forest_learns_threshold() {
        let (x, y) = separable(40);
        let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
        assert_eq!(forest.n_trees(), 100);
        assert_eq!(forest.n_features(), 2);
        assert!(forest.predict(&[38.0, 1.0]));
        assert!(!forest.predict(&[1.0, 1.0]));
    }

    #[test]
    fn test_forest_deterministic_for_seed() {
        let x: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i as f64 * 1.3).sin(), (i as f64 * 0.7).cos(), i as f64 % 3.0])
            .collect();
        let y: Vec<bool> = (0..60).map(|i| (i as f64 * 2.1).sin() > 0.0).collect();
        let params = ForestParams {
            n_trees: 25,
            ..Default::default()
        };

        let a = RandomForest::fit(&x, &y, &params).unwrap();
        let b = RandomForest::fit(&x, &y, &params).unwrap();
        for row in &x {
            assert_eq!(a.predict_proba(row), b.predict_proba(row));
        }
    }

    #[test]
    fn test_forest_single_class() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![true, true, true];
        let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
        assert_eq!(forest.predict_proba(&[10.0]), 1.0);
        assert_eq!(forest.max_depth(), 0);
    }

    #[test]
    fn test_forest_max_depth_respected() {
        let (x, y) = separable(64);
        let params = ForestParams {
            n_trees: 10,
            max_depth: Some(1),
            ..Default::default()
        };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();
        assert!(forest.max_depth() <= 1);
    }

    #[test]
    fn test_forest_rejects_empty() {
        let err = RandomForest::fit(&[], &[], &ForestParams::default()).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }

    #[test]
    fn test_forest_rejects_mismatched_labels() {
        let x = vec![vec![1.0], vec![2.0]];
        let err = RandomForest::fit(&x, &[true], &ForestParams::default()).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert_eq!(gini(5, 10), 0.5);
        assert_eq!(gini(0, 0), 0.0);
    }
}
