//! Isolation Forest
//!
//! Unsupervised anomaly scorer. Each tree isolates points with random
//! axis-aligned splits; anomalies end up on short paths.
//!
//! `decision_function` is shifted by the training-set percentile given by
//! `contamination`, so roughly that fraction of training rows score below 0.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ModelError;

const EULER_GAMMA: f64 = 0.577_215_664_9;

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl Node {
    fn path_length(&self, x: &[f64]) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    node = if x[*feature] < *threshold { left.as_ref() } else { right.as_ref() };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }

    fn check(&self, n_features: usize) -> Result<(), ModelError> {
        match self {
            Node::Split { feature, threshold, left, right } => {
                if *feature >= n_features {
                    return Err(ModelError::InvalidConfig(format!(
                        "split on feature {} but model has {} features",
                        feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::InvalidConfig(format!(
                        "split threshold must be finite, got {}",
                        threshold
                    )));
                }
                left.check(n_features)?;
                right.check(n_features)
            }
            Node::Leaf { .. } => Ok(()),
        }
    }
}

/// Isolation Forest parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: 0.05,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    pub params: ForestParams,
    pub n_features: usize,
    /// Rows drawn per tree
    pub sample_size: usize,
    /// Subtracted from raw scores so the contamination quantile sits at 0
    pub offset: f64,
    trees: Vec<Node>,
}

impl IsolationForest {
    pub fn fit(data: &[Vec<f64>], params: ForestParams) -> Result<Self, ModelError> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if !(params.contamination > 0.0 && params.contamination <= 0.5) {
            return Err(ModelError::InvalidConfig(format!(
                "contamination must be in (0, 0.5], got {}",
                params.contamination
            )));
        }
        if params.n_trees == 0 {
            return Err(ModelError::InvalidConfig("n_trees must be positive".to_string()));
        }

        let n_features = data[0].len();
        if let Some(bad) = data.iter().find(|row| row.len() != n_features) {
            return Err(ModelError::ShapeMismatch {
                expected: n_features,
                actual: bad.len(),
            });
        }

        let sample_size = params.max_samples.min(data.len()).max(1);
        let height_limit = (sample_size as f64).log2().ceil().max(0.0) as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_trees)
            .map(|_| {
                let rows: Vec<&[f64]> = index::sample(&mut rng, data.len(), sample_size)
                    .into_iter()
                    .map(|i| data[i].as_slice())
                    .collect();
                build_tree(&rows, 0, height_limit, n_features, &mut rng)
            })
            .collect();

        let mut forest = Self {
            params,
            n_features,
            sample_size,
            offset: 0.0,
            trees,
        };

        let mut training_scores = data
            .iter()
            .map(|row| forest.score_samples(row))
            .collect::<Result<Vec<_>, _>>()?;
        forest.offset = percentile(&mut training_scores, forest.params.contamination * 100.0);

        Ok(forest)
    }

    /// Raw anomaly score in [-1, 0); closer to -1 means easier to isolate
    pub fn score_samples(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>()
            / self.trees.len() as f64;
        let normalizer = average_path_length(self.sample_size).max(1.0);
        Ok(-(2f64.powf(-mean_path / normalizer)))
    }

    /// Shifted score; negative values are outliers at the fitted contamination
    pub fn decision_function(&self, x: &[f64]) -> Result<f64, ModelError> {
        Ok(self.score_samples(x)? - self.offset)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Structural check for forests read back from disk
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidConfig("forest has no trees".to_string()));
        }
        if self.sample_size == 0 {
            return Err(ModelError::InvalidConfig("sample_size must be positive".to_string()));
        }
        if !self.offset.is_finite() {
            return Err(ModelError::InvalidConfig(format!("offset must be finite, got {}", self.offset)));
        }
        self.trees.iter().try_for_each(|tree| tree.check(self.n_features))
    }
}

fn build_tree(
    rows: &[&[f64]],
    depth: usize,
    height_limit: usize,
    n_features: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    // Only features with spread can separate anything
    let candidates: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|f| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r[f]), hi.max(r[f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
        rows.iter().copied().partition(|r| r[feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(&left, depth + 1, height_limit, n_features, rng)),
        right: Box::new(build_tree(&right, depth + 1, height_limit, n_features, rng)),
    }
}

/// Expected path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile, `q` in [0, 100]
fn percentile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = (q / 100.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    values[lower] + (values[upper] - values[lower]) * frac
}
