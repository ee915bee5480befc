//! K-means with k-means++ seeding

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct KMeans {
    pub n_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// Lowest-inertia run of a k-means fit
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster per row, numbered by first appearance
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,

    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl KMeans {
    /// Cluster the rows; `n_clusters` is clamped to `[1, rows]`
    pub fn fit(&self, x: &[Vec<f64>]) -> KMeansFit {
        if x.is_empty() {
            return KMeansFit {
                labels: Vec::new(),
                centroids: Vec::new(),
                inertia: 0.0,
            };
        }

        let k = self.n_clusters.clamp(1, x.len());
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init.max(1) {
            let centroids = plus_plus_init(x, k, &mut rng);
            let run = self.lloyd(x, centroids);
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let mut fit = best.unwrap_or(KMeansFit {
            labels: vec![0; x.len()],
            centroids: Vec::new(),
            inertia: 0.0,
        });
        relabel_by_first_appearance(&mut fit);
        fit
    }

    fn lloyd(&self, x: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> KMeansFit {
        let width = x[0].len();
        let mut labels = vec![0; x.len()];

        for _ in 0..self.max_iter {
            for (label, row) in labels.iter_mut().zip(x) {
                *label = nearest(row, &centroids).0;
            }

            let mut sums = vec![vec![0.0; width]; centroids.len()];
            let mut counts = vec![0usize; centroids.len()];
            for (&label, row) in labels.iter().zip(x) {
                counts[label] += 1;
                for (s, v) in sums[label].iter_mut().zip(row) {
                    *s += v;
                }
            }

            let mut shift = 0.0;
            for (c, (sum, &count)) in sums.iter().zip(&counts).enumerate() {
                // An emptied cluster keeps its previous centroid
                if count == 0 {
                    continue;
                }
                let updated: Vec<f64> = sum.iter().map(|s| s / count as f64).collect();
                shift += squared_distance(&centroids[c], &updated);
                centroids[c] = updated;
            }

            if shift <= self.tol {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, row) in labels.iter_mut().zip(x) {
            let (nearest_c, distance) = nearest(row, &centroids);
            *label = nearest_c;
            inertia += distance;
        }

        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

fn plus_plus_init(x: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let mut centroids = vec![x[rng.gen_range(0..x.len())].clone()];

    while centroids.len() < k {
        let distances: Vec<f64> = x.iter().map(|row| nearest(row, &centroids).1).collect();
        let total: f64 = distances.iter().sum();

        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = x.len() - 1;
            for (i, d) in distances.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            rng.gen_range(0..x.len())
        };
        centroids.push(x[chosen].clone());
    }

    centroids
}

/// Index of and squared distance to the closest centroid; ties go to the
/// lower index
fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(row, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Renumber clusters in order of first appearance in the rows
fn relabel_by_first_appearance(fit: &mut KMeansFit) {
    let mut mapping: Vec<Option<usize>> = vec![None; fit.centroids.len().max(1)];
    let mut next = 0;
    for label in &fit.labels {
        if mapping[*label].is_none() {
            mapping[*label] = Some(next);
            next += 1;
        }
    }

    let mut centroids = vec![Vec::new(); next];
    for (old, new) in mapping.iter().enumerate() {
        if let (Some(new), Some(centroid)) = (new, fit.centroids.get(old)) {
            centroids[*new] = centroid.clone();
        }
    }

    for label in &mut fit.labels {
        *label = mapping[*label].unwrap_or(0);
    }
    fit.centroids = centroids;
}
