// K-means over dense document rows, backed by aprender's KMeans
// (k-means++ seeding, Lloyd iterations).

use anyhow::Result;
use aprender::prelude::*;
use aprender::primitives::Matrix;
use tracing::debug;

pub struct KMeans {
    pub k: usize,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: 5,
            max_iter: 300,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster of each input row, in [0, n_clusters)
    pub labels: Vec<usize>,
    /// k after capping at the row count
    pub n_clusters: usize,
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            ..Self::default()
        }
    }

    /// Cluster the rows of `data`. k is capped at the number of rows.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit> {
        let n = data.len();
        if self.k == 0 && n > 0 {
            anyhow::bail!("k-means needs at least one cluster");
        }
        let k = self.k.min(n);
        if k == 0 {
            return Ok(KMeansFit {
                labels: Vec::new(),
                n_clusters: 0,
            });
        }
        if k == 1 {
            return Ok(KMeansFit {
                labels: vec![0; n],
                n_clusters: 1,
            });
        }

        let matrix = to_matrix(data)?;
        let mut model = aprender::cluster::KMeans::new(k)
            .with_max_iter(self.max_iter)
            .with_random_state(self.seed);
        model
            .fit(&matrix)
            .map_err(|e| anyhow::anyhow!("k-means failed on {n} rows: {e}"))?;
        let labels: Vec<usize> = model.predict(&matrix);

        debug!(k, rows = n, "K-means fitted");

        Ok(KMeansFit {
            labels,
            n_clusters: k,
        })
    }
}

/// Pack rows into the row-major f32 matrix the clustering models take.
fn to_matrix(data: &[Vec<f64>]) -> Result<Matrix<f32>> {
    let n = data.len();
    let dim = data.first().map(|r| r.len()).unwrap_or(0);
    if data.iter().any(|r| r.len() != dim) {
        anyhow::bail!("k-means rows must all have {dim} columns");
    }
    let values: Vec<f32> = data.iter().flatten().map(|&v| v as f32).collect();
    Matrix::from_vec(n, dim, values)
        .map_err(|e| anyhow::anyhow!("Failed to build a {n}x{dim} matrix: {e}"))
}
