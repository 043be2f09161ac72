//! Unsupervised anomaly scorer: an isolation forest over historical
//! feature vectors.
//!
//! A point that random axis-aligned splits separate from the bulk in
//! few steps is anomalous. Raw scores use the standard
//! `2^(-E(h)/c(psi))` normalization, then get calibrated against the
//! training window so downstream tier thresholds stay stable across
//! refits: the window's median raw score maps to 0, its maximum to 1.
//!
//! Fitting is fully determined by (seed, samples). A fitted forest is
//! immutable; refits build a replacement and swap it in via
//! [`crate::model::ModelManager`].

use crate::{
    features::FEATURE_COUNT,
    rng::DetRng,
    transaction::Calibration,
};
use chrono::{DateTime, Utc};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum IsoNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsoNode>,
        right: Box<IsoNode>,
    },
    Leaf {
        size: usize,
    },
}

struct IsoTree {
    root: IsoNode,
}

impl IsoTree {
    fn path_length(&self, point: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                IsoNode::Leaf { size } => {
                    return depth + expected_path_length(*size);
                }
                IsoNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if point[*feature] < *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

pub struct IsolationForest {
    trees: Vec<IsoTree>,
    sample_count: usize,
    subsample: usize,
    calibration: Calibration,
    fitted_at: DateTime<Utc>,
}

impl IsolationForest {
    /// Fit a forest on the historical window. Callers guarantee a
    /// non-empty sample set; the minimum-sample gate lives in the
    /// model manager.
    pub fn fit(
        samples: &[[f64; FEATURE_COUNT]],
        trees: usize,
        subsample: usize,
        seed: u64,
    ) -> Self {
        debug_assert!(!samples.is_empty());
        let n = samples.len();
        let psi = subsample.min(n);
        let depth_limit = (psi.max(2) as f64).log2().ceil() as usize;

        let built: Vec<IsoTree> = (0..trees)
            .map(|t| {
                let mut rng = DetRng::new(seed, t as u64);
                let picked = subsample_indices(n, psi, &mut rng);
                IsoTree {
                    root: build_node(samples, &picked, 0, depth_limit, &mut rng),
                }
            })
            .collect();

        let mut forest = Self {
            trees: built,
            sample_count: n,
            subsample: psi,
            calibration: Calibration { center: 0.0, max: 1.0 },
            fitted_at: Utc::now(),
        };
        forest.calibration = forest.calibrate(samples);
        forest
    }

    /// Raw isolation score in (0, 1): ~0.5 for ordinary points, toward
    /// 1 for easily separated ones.
    pub fn raw_score(&self, point: &[f64; FEATURE_COUNT]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(point)).sum();
        let avg = total / self.trees.len() as f64;
        let denom = expected_path_length(self.subsample).max(1.0);
        2f64.powf(-avg / denom)
    }

    /// Calibrated anomaly score in [0, 1].
    pub fn score(&self, point: &[f64; FEATURE_COUNT]) -> f64 {
        let raw = self.raw_score(point);
        let denom = (self.calibration.max - self.calibration.center).max(1e-9);
        ((raw - self.calibration.center) / denom).clamp(0.0, 1.0)
    }

    /// Confidence grows with the fitted sample count, capped below 1.
    pub fn confidence(&self) -> f64 {
        let n = self.sample_count as f64;
        (n / (n + 100.0)).min(0.95)
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn subsample(&self) -> usize {
        self.subsample
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn calibrate(&self, samples: &[[f64; FEATURE_COUNT]]) -> Calibration {
        let mut raws: Vec<f64> = samples.iter().map(|s| self.raw_score(s)).collect();
        raws.sort_by(|a, b| a.total_cmp(b));
        Calibration {
            center: raws[raws.len() / 2],
            max: raws[raws.len() - 1],
        }
    }
}

/// Average unsuccessful-search path length of a binary search tree
/// over n points — the `c(n)` term from the isolation forest paper.
fn expected_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
}

/// Pick `psi` distinct indices via a partial Fisher-Yates shuffle.
fn subsample_indices(n: usize, psi: usize, rng: &mut DetRng) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..psi.min(n.saturating_sub(1)) {
        let j = i + rng.next_u64_below((n - i) as u64) as usize;
        pool.swap(i, j);
    }
    pool.truncate(psi);
    pool
}

fn build_node(
    samples: &[[f64; FEATURE_COUNT]],
    indices: &[usize],
    depth: usize,
    depth_limit: usize,
    rng: &mut DetRng,
) -> IsoNode {
    if depth >= depth_limit || indices.len() <= 1 {
        return IsoNode::Leaf { size: indices.len() };
    }

    // Pick a feature that still varies within this node. Constant
    // features (flags in a homogeneous window) cannot split anything.
    let mut chosen = None;
    for _ in 0..FEATURE_COUNT {
        let f = rng.next_u64_below(FEATURE_COUNT as u64) as usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &i in indices {
            min = min.min(samples[i][f]);
            max = max.max(samples[i][f]);
        }
        if max > min {
            chosen = Some((f, min, max));
            break;
        }
    }
    let Some((feature, min, max)) = chosen else {
        return IsoNode::Leaf { size: indices.len() };
    };

    let threshold = min + rng.next_f64() * (max - min);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| samples[i][feature] < threshold);
    if left.is_empty() || right.is_empty() {
        return IsoNode::Leaf { size: indices.len() };
    }

    IsoNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(samples, &left, depth + 1, depth_limit, rng)),
        right: Box::new(build_node(samples, &right, depth + 1, depth_limit, rng)),
    }
}
