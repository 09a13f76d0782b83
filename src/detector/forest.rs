//! Isolation forest
//!
//! An ensemble of randomly-built binary trees. Each tree partitions a
//! subsample of the data with random axis-aligned splits; points that end
//! up in shallow leaves were easy to isolate and score close to 1, points
//! deep in the trees score closer to 0.
//!
//! Scores follow the usual normalization: `s = 2^(-E[h(x)] / c(ψ))` where
//! `E[h(x)]` is the mean path length over the ensemble and `c(ψ)` the
//! expected path length of an unsuccessful binary search tree lookup over
//! the subsample size.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// A fitted ensemble of isolation trees
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample: usize,
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl IsolationForest {
    /// Fit `trees` isolation trees over `data` (rows of equal-length
    /// feature vectors). Each tree sees a without-replacement subsample of
    /// at most `max_samples` rows. The same seed over the same data
    /// produces an identical forest.
    pub fn fit(data: &[Vec<f64>], trees: usize, max_samples: usize, seed: u64) -> Self {
        let n = data.len();
        let subsample = max_samples.min(n).max(1);
        // Grown trees isolate most points well before this depth
        let height_limit = (subsample as f64).log2().ceil().max(1.0) as usize;

        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..n).collect();

        let trees = (0..trees)
            .map(|_| {
                let (sampled, _) = indices.partial_shuffle(&mut rng, subsample);
                let sample = sampled.to_vec();
                build_node(data, sample, 0, height_limit, &mut rng)
            })
            .collect();

        Self { trees, subsample }
    }

    /// Anomaly score for one point, in (0, 1]; higher is more isolated
    pub fn score(&self, point: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| path_length(t, point)).sum();
        let mean = total / self.trees.len() as f64;
        2f64.powf(-mean / average_path_length(self.subsample).max(f64::MIN_POSITIVE))
    }
}

fn build_node(
    data: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut ChaCha20Rng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features with spread inside this partition can split it
    let dims = data[indices[0]].len();
    let candidates: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|feature| {
            let (min, max) = indices.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), &i| {
                    let v = data[i][feature];
                    (min.min(v), max.max(v))
                },
            );
            (min < max).then_some((feature, min, max))
        })
        .collect();

    if candidates.is_empty() {
        // All remaining points are identical
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.random_range(0..candidates.len())];
    let threshold = rng.random_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| data[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(data, left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(data, right, depth + 1, height_limit, rng)),
    }
}

fn path_length(mut node: &Node, point: &[f64]) -> f64 {
    let mut depth = 0.0;
    loop {
        match node {
            Node::Leaf { size } => return depth + average_path_length(*size),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                depth += 1.0;
                node = if point[*feature] < *threshold {
                    left
                } else {
                    right
                };
            }
        }
    }
}

/// Expected path length of an unsuccessful search in a binary search tree
/// of `m` nodes. Truncated leaves add this for the points they hold.
fn average_path_length(m: usize) -> f64 {
    match m {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let m = m as f64;
            2.0 * ((m - 1.0).ln() + EULER_GAMMA) - 2.0 * (m - 1.0) / m
        }
    }
}
