//! Binary random forest classifier.
//!
//! CART trees on Gini impurity, grown on bootstrap samples with a random subset of
//! `sqrt(n_features)` candidate features per split. Sample weights carry the class
//! weighting, so a balanced forest treats both classes as equally frequent.

use crate::job::{ClassWeight, TrainingHyperParams};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { positive: f64 },
}

/// A single fitted tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fraction of (weighted) positive samples in the leaf `row` lands in.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { positive } => return *positive,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[idx] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

struct Training<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    weights: [f64; 2],
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl RandomForest {
    /// Fit on `x` (row-major) with boolean targets. `on_tree` is called after each tree.
    ///
    /// Callers guarantee `x` is non-empty, rectangular and `y` has both classes.
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &TrainingHyperParams, mut on_tree: impl FnMut(usize)) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, Vec::len);
        let n_pos = y.iter().filter(|&&p| p).count();

        let weights = match params.class_weight {
            ClassWeight::Balanced => [balanced_weight(n, n - n_pos), balanced_weight(n, n_pos)],
            ClassWeight::Uniform => [1.0, 1.0],
        };

        let ctx = Training {
            x,
            y,
            weights,
            max_features: ((n_features as f64).sqrt().floor() as usize).max(1),
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
        };

        let mut master = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);
        for i in 0..params.n_estimators {
            let mut rng = StdRng::seed_from_u64(master.next_u64());
            let samples: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(ctx.grow(samples, &mut rng));
            on_tree(i + 1);
        }

        Self { n_features, trees }
    }

    /// Mean positive-class probability over all trees.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Positive when the averaged probability exceeds one half; ties go negative.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

fn balanced_weight(n: usize, class_count: usize) -> f64 {
    if class_count == 0 {
        0.0
    } else {
        n as f64 / (2.0 * class_count as f64)
    }
}

fn gini(pos: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let p = pos / total;
    2.0 * p * (1.0 - p)
}

impl Training<'_> {
    fn weight(&self, i: usize) -> f64 {
        self.weights[usize::from(self.y[i])]
    }

    fn grow(&self, samples: Vec<usize>, rng: &mut StdRng) -> DecisionTree {
        let mut nodes = vec![Node::Leaf { positive: 0.0 }];
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((slot, samples, depth)) = stack.pop() {
            let total: f64 = samples.iter().map(|&i| self.weight(i)).sum();
            let pos: f64 = samples.iter().filter(|&&i| self.y[i]).map(|&i| self.weight(i)).sum();
            let leaf = Node::Leaf { positive: if total > 0.0 { pos / total } else { 0.0 } };

            let first = self.y[samples[0]];
            let pure = samples.iter().all(|&i| self.y[i] == first);
            let too_deep = self.max_depth.is_some_and(|d| depth >= d);
            if pure || too_deep || samples.len() < self.min_samples_split {
                nodes[slot] = leaf;
                continue;
            }

            let Some(split) = self.best_split(&samples, rng) else {
                nodes[slot] = leaf;
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) =
                samples.iter().partition(|&&i| self.x[i][split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { positive: 0.0 });
            nodes.push(Node::Leaf { positive: 0.0 });
            nodes[slot] = Node::Split { feature: split.feature, threshold: split.threshold, left, right };

            stack.push((left, left_samples, depth + 1));
            stack.push((right, right_samples, depth + 1));
        }

        DecisionTree { nodes }
    }

    /// Lowest weighted child impurity over up to `max_features` non-constant features.
    fn best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<SplitChoice> {
        let n_features = self.x[samples[0]].len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let total: f64 = samples.iter().map(|&i| self.weight(i)).sum();
        let pos_total: f64 = samples.iter().filter(|&&i| self.y[i]).map(|&i| self.weight(i)).sum();

        let mut best: Option<SplitChoice> = None;
        let mut visited = 0;
        let mut sorted = samples.to_vec();

        for feature in features {
            if visited >= self.max_features {
                break;
            }
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));
            let lo = self.x[sorted[0]][feature];
            let hi = self.x[sorted[sorted.len() - 1]][feature];
            if lo >= hi {
                continue;
            }
            visited += 1;

            let mut left_w = 0.0;
            let mut left_pos = 0.0;
            for k in 0..sorted.len() - 1 {
                let i = sorted[k];
                left_w += self.weight(i);
                if self.y[i] {
                    left_pos += self.weight(i);
                }

                let here = self.x[i][feature];
                let next = self.x[sorted[k + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_w = total - left_w;
                let impurity = left_w * gini(left_pos, left_w) + right_w * gini(pos_total - left_pos, right_w);
                if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                    let mid = here + (next - here) / 2.0;
                    let threshold = if mid < next { mid } else { here };
                    best = Some(SplitChoice { feature, threshold, impurity });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_estimators: usize) -> TrainingHyperParams {
        TrainingHyperParams { n_estimators, ..TrainingHyperParams::default() }
    }

    #[test]
    fn test_separable_data_is_learned() {
        let x: Vec<Vec<f64>> = (0..20_i32).map(|i| vec![f64::from(i), 1.0]).collect();
        let y: Vec<bool> = (0..20).map(|i| i >= 10).collect();

        let forest = RandomForest::fit(&x, &y, &params(25), |_| {});
        assert_eq!(forest.trees().len(), 25);
        assert!(forest.predict(&[18.0, 1.0]));
        assert!(!forest.predict(&[1.0, 1.0]));
        assert!(forest.predict_proba(&[19.0, 1.0]) > forest.predict_proba(&[0.0, 1.0]));
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let x: Vec<Vec<f64>> = (0..12_i32).map(|i| vec![f64::from(i % 5), f64::from(i)]).collect();
        let y: Vec<bool> = (0..12).map(|i| i % 3 == 0).collect();

        let a = RandomForest::fit(&x, &y, &params(10), |_| {});
        let b = RandomForest::fit(&x, &y, &params(10), |_| {});
        assert_eq!(a, b);
    }

    #[test]
    fn test_on_tree_reports_every_tree() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![false, true];
        let mut seen = Vec::new();
        RandomForest::fit(&x, &y, &params(3), |n| seen.push(n));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_max_depth_limits_trees() {
        let x: Vec<Vec<f64>> = (0..32_i32).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<bool> = (0..32).map(|i| i % 2 == 0).collect();
        let p = TrainingHyperParams { n_estimators: 5, max_depth: Some(2), ..TrainingHyperParams::default() };

        let forest = RandomForest::fit(&x, &y, &p, |_| {});
        assert!(forest.trees().iter().all(|t| t.depth() <= 2));
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![false, true, true];
        let p = TrainingHyperParams { n_estimators: 1, bootstrap: false, ..TrainingHyperParams::default() };

        let forest = RandomForest::fit(&x, &y, &p, |_| {});
        assert_eq!(forest.trees()[0].n_nodes(), 1);
        // balanced weights: one negative at 1.5 vs two positives at 0.75 each
        assert!((forest.predict_proba(&[1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_weights_follow_class_frequency() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![false, true, true];
        let p = TrainingHyperParams {
            n_estimators: 1,
            bootstrap: false,
            class_weight: ClassWeight::Uniform,
            ..TrainingHyperParams::default()
        };

        let forest = RandomForest::fit(&x, &y, &p, |_| {});
        assert!((forest.predict_proba(&[1.0]) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weight() {
        assert!((balanced_weight(3, 1) - 1.5).abs() < 1e-12);
        assert!((balanced_weight(3, 2) - 0.75).abs() < 1e-12);
        assert_eq!(balanced_weight(3, 0), 0.0);
    }
}
