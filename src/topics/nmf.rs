// Non-negative matrix factorization, X ≈ W · H.
//
// X is the sparse n_docs × n_terms TF-IDF matrix, W (n_docs × k) holds each
// document's topic weights and H (k × n_terms) each topic's term weights.
// Fitting uses the Frobenius multiplicative updates:
//
//   H ← H ∘ (Wᵀ X) / (Wᵀ W H)
//   W ← W ∘ (X Hᵀ) / (W H Hᵀ)
//
// Initialization draws uniform values scaled by sqrt(mean(X) / k) from a
// seeded RNG, so a fixed seed and corpus always give the same factors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::tfidf::SparseRow;

/// Guards the multiplicative updates against division by zero.
const EPSILON: f64 = 1e-10;

/// How often (in iterations) the reconstruction error is checked.
const CHECK_EVERY: usize = 10;

pub struct Nmf {
    pub n_components: usize,
    pub max_iter: usize,
    /// Stop when the relative error improvement drops below this
    pub tol: f64,
    pub seed: u64,
}

impl Default for Nmf {
    fn default() -> Self {
        Self {
            n_components: 10,
            max_iter: 200,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// A fitted factorization.
#[derive(Debug, Clone)]
pub struct NmfFit {
    /// Document-topic weights, one row per document
    pub w: Vec<Vec<f64>>,
    /// Topic-term weights, one row per topic
    pub h: Vec<Vec<f64>>,
    pub n_iter: usize,
    /// Final Frobenius norm of X - WH
    pub reconstruction_err: f64,
}

impl Nmf {
    pub fn new(n_components: usize, seed: u64) -> Self {
        Self {
            n_components,
            seed,
            ..Self::default()
        }
    }

    /// Factorize `x`, whose rows have `n_features` columns.
    pub fn fit(&self, x: &[SparseRow], n_features: usize) -> NmfFit {
        let k = self.n_components.max(1);
        let n = x.len();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let scale = (mean_value(x, n_features) / k as f64).sqrt();
        let mut h = random_matrix(&mut rng, k, n_features, scale);
        let mut w = random_matrix(&mut rng, n, k, scale);

        let x_norm_sq: f64 = x.iter().flatten().map(|(_, v)| v * v).sum();
        let initial_err = frobenius_error(x, &w, &h, x_norm_sq);
        let mut previous_err = initial_err;
        let mut n_iter = 0;

        for iter in 1..=self.max_iter {
            n_iter = iter;
            update_h(x, &w, &mut h);
            update_w(x, &mut w, &h);

            if iter % CHECK_EVERY == 0 {
                let err = frobenius_error(x, &w, &h, x_norm_sq);
                if initial_err > 0.0 && (previous_err - err) / initial_err < self.tol {
                    break;
                }
                previous_err = err;
            }
        }

        let reconstruction_err = frobenius_error(x, &w, &h, x_norm_sq);
        debug!(
            components = k,
            iterations = n_iter,
            error = reconstruction_err,
            "NMF converged"
        );

        NmfFit {
            w,
            h,
            n_iter,
            reconstruction_err,
        }
    }
}

impl NmfFit {
    /// Topic weights for new documents, holding the topic-term matrix fixed.
    pub fn transform(&self, x: &[SparseRow], max_iter: usize, seed: u64) -> Vec<Vec<f64>> {
        let k = self.h.len();
        let n_features = self.h.first().map(|r| r.len()).unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(seed);
        let scale = (mean_value(x, n_features) / k.max(1) as f64).sqrt();
        let mut w = random_matrix(&mut rng, x.len(), k, scale);
        for _ in 0..max_iter {
            update_w(x, &mut w, &self.h);
        }
        w
    }
}

/// Index of the largest weight, first index on ties. Empty rows map to 0.
pub fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Mean over every cell of the (implicitly dense) matrix.
fn mean_value(x: &[SparseRow], n_features: usize) -> f64 {
    let cells = x.len() * n_features;
    if cells == 0 {
        return 0.0;
    }
    x.iter().flatten().map(|(_, v)| v).sum::<f64>() / cells as f64
}

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, scale: f64) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.random::<f64>() * scale).collect())
        .collect()
}

/// k × k Gram matrix of the rows of `m` (m · mᵀ for H, or Wᵀ · W for W).
fn gram_rows(m: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut g = vec![vec![0.0; k]; k];
    for a in 0..k {
        for b in a..k {
            let dot: f64 = m[a].iter().zip(&m[b]).map(|(x, y)| x * y).sum();
            g[a][b] = dot;
            g[b][a] = dot;
        }
    }
    g
}

fn gram_cols(w: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut g = vec![vec![0.0; k]; k];
    for row in w {
        for a in 0..k {
            for b in 0..k {
                g[a][b] += row[a] * row[b];
            }
        }
    }
    g
}

fn update_h(x: &[SparseRow], w: &[Vec<f64>], h: &mut [Vec<f64>]) {
    let k = h.len();
    let n_features = h.first().map(|r| r.len()).unwrap_or(0);

    // Wᵀ X
    let mut numerator = vec![vec![0.0; n_features]; k];
    for (row, w_row) in x.iter().zip(w) {
        for &(col, value) in row {
            for t in 0..k {
                numerator[t][col] += w_row[t] * value;
            }
        }
    }

    // (Wᵀ W) H
    let wtw = gram_cols(w, k);
    for t in 0..k {
        for col in 0..n_features {
            let denom: f64 = (0..k).map(|s| wtw[t][s] * h[s][col]).sum();
            h[t][col] *= numerator[t][col] / (denom + EPSILON);
        }
    }
}

fn update_w(x: &[SparseRow], w: &mut [Vec<f64>], h: &[Vec<f64>]) {
    let k = h.len();
    let hht = gram_rows(h, k);

    for (row, w_row) in x.iter().zip(w.iter_mut()) {
        // X Hᵀ for this document
        let mut numerator = vec![0.0; k];
        for &(col, value) in row {
            for t in 0..k {
                numerator[t] += value * h[t][col];
            }
        }
        // W (H Hᵀ) for this document
        let denom: Vec<f64> = (0..k)
            .map(|t| (0..k).map(|s| w_row[s] * hht[s][t]).sum())
            .collect();
        for t in 0..k {
            w_row[t] *= numerator[t] / (denom[t] + EPSILON);
        }
    }
}

/// ‖X − WH‖_F computed without materializing WH:
/// ‖X‖² − 2·Σ (X ∘ WH) + tr((WᵀW)(HHᵀ)).
fn frobenius_error(x: &[SparseRow], w: &[Vec<f64>], h: &[Vec<f64>], x_norm_sq: f64) -> f64 {
    let k = h.len();
    let mut cross = 0.0;
    for (row, w_row) in x.iter().zip(w) {
        for &(col, value) in row {
            let approx: f64 = (0..k).map(|t| w_row[t] * h[t][col]).sum();
            cross += value * approx;
        }
    }
    let wtw = gram_cols(w, k);
    let hht = gram_rows(h, k);
    let mut trace = 0.0;
    for a in 0..k {
        for b in 0..k {
            trace += wtw[a][b] * hht[b][a];
        }
    }
    (x_norm_sq - 2.0 * cross + trace).max(0.0).sqrt()
}
