//! Density-based clustering (DBSCAN)

use super::kmeans::squared_distance;
use scholarnet_common::models::ClusterAssignment;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Neighborhood radius (Euclidean)
    pub eps: f64,

    /// Neighbors needed for a core point, the point itself included
    pub min_samples: usize,
}

impl Default for Dbscan {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 3,
        }
    }
}

impl Dbscan {
    /// Label every row; noise is -1 and clusters are numbered in row order
    pub fn fit(&self, x: &[Vec<f64>]) -> Vec<i32> {
        let n = x.len();
        let eps_sq = self.eps * self.eps;

        let neighbors: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| squared_distance(&x[i], &x[j]) <= eps_sq)
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|hood| hood.len() >= self.min_samples)
            .collect();

        let mut labels = vec![ClusterAssignment::NOISE; n];
        let mut next_label = 0;

        for start in 0..n {
            if labels[start] != ClusterAssignment::NOISE || !is_core[start] {
                continue;
            }

            labels[start] = next_label;
            let mut queue = VecDeque::from([start]);
            while let Some(point) = queue.pop_front() {
                if !is_core[point] {
                    continue;
                }
                for &neighbor in &neighbors[point] {
                    if labels[neighbor] == ClusterAssignment::NOISE {
                        labels[neighbor] = next_label;
                        queue.push_back(neighbor);
                    }
                }
            }
            next_label += 1;
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_groups_and_noise() {
        let x = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![20.0, 20.0],
        ];
        let labels = Dbscan::default().fit(&x);
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1, -1]);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // 0.9 is within eps of 0.5 (a core point) but has only two neighbors
        let x = vec![vec![0.0], vec![0.2], vec![0.5], vec![0.9]];
        let labels = Dbscan::default().fit(&x);
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_sparse_points_are_noise() {
        let x = vec![vec![0.0], vec![3.0], vec![6.0]];
        assert_eq!(Dbscan::default().fit(&x), vec![-1, -1, -1]);
    }
}
