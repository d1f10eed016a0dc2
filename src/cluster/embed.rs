// 2D layout of document vectors, UMAP style.
//
// 1. Fuzzy kNN graph: for each point, its nearest neighbours (self included)
//    get membership exp(-(d - rho) / sigma), where rho is the distance to the
//    nearest other point and sigma is found by binary search so memberships
//    sum to log2(k).
// 2. Symmetrize with the fuzzy union a + b - ab.
// 3. Lay out with SGD from a seeded random start: edges are sampled in
//    proportion to their weight and pull their endpoints together, random
//    non-neighbours push apart. The learning rate decays linearly.
//
// Brute-force neighbours make this quadratic in the number of documents,
// which is fine at the scale of a few thousand posts.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const SIGMA_SEARCH_STEPS: usize = 64;
const SIGMA_TOLERANCE: f64 = 1e-5;
const MIN_SIGMA_SCALE: f64 = 1e-3;
const GRADIENT_CLIP: f64 = 4.0;
const INIT_RANGE: f64 = 10.0;

pub struct UmapLayout {
    pub n_neighbors: usize,
    pub n_epochs: usize,
    pub negative_sample_rate: usize,
    /// Low-dimensional curve 1 / (1 + a·d^2b); the defaults fit min_dist 0.1
    pub a: f64,
    pub b: f64,
    pub seed: u64,
}

impl Default for UmapLayout {
    fn default() -> Self {
        Self {
            n_neighbors: 15,
            n_epochs: 200,
            negative_sample_rate: 5,
            a: 1.577,
            b: 0.8951,
            seed: 42,
        }
    }
}

/// One undirected edge of the fuzzy graph.
#[derive(Debug, Clone, Copy)]
struct Edge {
    head: usize,
    tail: usize,
    weight: f64,
}

impl UmapLayout {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Embed each row of `data` as an (x, y) point.
    pub fn fit(&self, data: &[Vec<f64>]) -> Vec<(f64, f64)> {
        match data.len() {
            0 => return Vec::new(),
            1 => return vec![(0.0, 0.0)],
            _ => {}
        }

        let edges = self.fuzzy_graph(data);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut coords: Vec<[f64; 2]> = (0..data.len())
            .map(|_| {
                [
                    rng.random_range(-INIT_RANGE..INIT_RANGE),
                    rng.random_range(-INIT_RANGE..INIT_RANGE),
                ]
            })
            .collect();

        self.optimize(&mut coords, &edges, &mut rng);
        debug!(points = data.len(), edges = edges.len(), "Computed 2D layout");

        coords.into_iter().map(|[x, y]| (x, y)).collect()
    }

    fn fuzzy_graph(&self, data: &[Vec<f64>]) -> Vec<Edge> {
        let n = data.len();
        let k = self.n_neighbors.clamp(2, n);
        let target = (k as f64).log2();

        // Directed memberships, keyed (from, to) so edge order is deterministic
        let mut directed: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for i in 0..n {
            let mut dists: Vec<(usize, f64)> = (0..n)
                .map(|j| (j, euclidean(&data[i], &data[j])))
                .collect();
            dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            let neighbours: Vec<(usize, f64)> =
                dists.into_iter().filter(|(j, _)| *j != i).take(k - 1).collect();

            let rho = neighbours
                .iter()
                .map(|(_, d)| *d)
                .find(|d| *d > 0.0)
                .unwrap_or(0.0);
            let sigma = smooth_sigma(&neighbours, rho, target);

            for &(j, d) in &neighbours {
                let membership = if d <= rho {
                    1.0
                } else {
                    (-(d - rho) / sigma).exp()
                };
                directed.insert((i, j), membership);
            }
        }

        let mut edges = Vec::new();
        for (&(i, j), &w_ij) in &directed {
            if i > j && directed.contains_key(&(j, i)) {
                // Already emitted from the (j, i) side
                continue;
            }
            let w_ji = directed.get(&(j, i)).copied().unwrap_or(0.0);
            let weight = w_ij + w_ji - w_ij * w_ji;
            if weight > 0.0 {
                edges.push(Edge {
                    head: i,
                    tail: j,
                    weight,
                });
            }
        }
        edges
    }

    fn optimize(&self, coords: &mut [[f64; 2]], edges: &[Edge], rng: &mut StdRng) {
        let n = coords.len();
        let max_weight = edges.iter().map(|e| e.weight).fold(0.0, f64::max);
        if max_weight <= 0.0 {
            return;
        }
        let (a, b) = (self.a, self.b);

        for epoch in 0..self.n_epochs {
            let alpha = 1.0 - epoch as f64 / self.n_epochs as f64;

            for edge in edges {
                if rng.random::<f64>() > edge.weight / max_weight {
                    continue;
                }

                let (i, j) = (edge.head, edge.tail);
                let diff = [coords[i][0] - coords[j][0], coords[i][1] - coords[j][1]];
                let dist_sq = diff[0] * diff[0] + diff[1] * diff[1];
                if dist_sq > 0.0 {
                    let coeff = -2.0 * a * b * dist_sq.powf(b - 1.0)
                        / (1.0 + a * dist_sq.powf(b));
                    for d in 0..2 {
                        let grad = clip(coeff * diff[d]) * alpha;
                        coords[i][d] += grad;
                        coords[j][d] -= grad;
                    }
                }

                for _ in 0..self.negative_sample_rate {
                    let other = rng.random_range(0..n);
                    if other == i {
                        continue;
                    }
                    let diff = [
                        coords[i][0] - coords[other][0],
                        coords[i][1] - coords[other][1],
                    ];
                    let dist_sq = diff[0] * diff[0] + diff[1] * diff[1];
                    let coeff = if dist_sq > 0.0 {
                        2.0 * b / ((0.001 + dist_sq) * (1.0 + a * dist_sq.powf(b)))
                    } else {
                        0.0
                    };
                    for d in 0..2 {
                        let grad = if coeff > 0.0 {
                            clip(coeff * diff[d])
                        } else {
                            GRADIENT_CLIP
                        };
                        coords[i][d] += grad * alpha;
                    }
                }
            }
        }
    }
}

/// Binary search for the sigma that makes the neighbour memberships sum to `target`.
fn smooth_sigma(neighbours: &[(usize, f64)], rho: f64, target: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = f64::INFINITY;
    let mut mid = 1.0;

    for _ in 0..SIGMA_SEARCH_STEPS {
        let total: f64 = neighbours
            .iter()
            .map(|(_, d)| {
                let excess = d - rho;
                if excess > 0.0 {
                    (-excess / mid).exp()
                } else {
                    1.0
                }
            })
            .sum();

        if (total - target).abs() < SIGMA_TOLERANCE {
            break;
        }
        if total > target {
            hi = mid;
            mid = (lo + hi) / 2.0;
        } else {
            lo = mid;
            mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
        }
    }

    let mean_dist = if neighbours.is_empty() {
        0.0
    } else {
        neighbours.iter().map(|(_, d)| d).sum::<f64>() / neighbours.len() as f64
    };
    mid.max(MIN_SIGMA_SCALE * mean_dist).max(f64::MIN_POSITIVE)
}

fn clip(value: f64) -> f64 {
    value.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> Vec<Vec<f64>> {
        let mut data = Vec::new();
        for i in 0..6 {
            data.push(vec![1.0, 0.0, 0.01 * i as f64]);
        }
        for i in 0..6 {
            data.push(vec![0.0, 1.0, 0.01 * i as f64]);
        }
        data
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(UmapLayout::default().fit(&[]).is_empty());
        assert_eq!(UmapLayout::default().fit(&[vec![1.0, 2.0]]), vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_one_point_per_row_and_finite() {
        let layout = UmapLayout::new(42).fit(&two_groups());
        assert_eq!(layout.len(), 12);
        assert!(layout.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = UmapLayout::new(9).fit(&two_groups());
        let b = UmapLayout::new(9).fit(&two_groups());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sigma_hits_target() {
        let neighbours = vec![(1, 0.5), (2, 1.0), (3, 2.0)];
        let sigma = smooth_sigma(&neighbours, 0.5, 2.0);
        let total: f64 = neighbours
            .iter()
            .map(|(_, d)| {
                let excess: f64 = d - 0.5;
                if excess > 0.0 {
                    (-excess / sigma).exp()
                } else {
                    1.0
                }
            })
            .sum();
        assert!((total - 2.0).abs() < 1e-3, "total {total}");
    }
}
