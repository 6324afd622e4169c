//! Proximity classifier.
//!
//! Flags every detection whose centroid is strictly closer than the minimum
//! distance to at least one other centroid. Pure and stateless: the same
//! detections always produce the same `ViolationSet`.

use std::collections::BTreeSet;

use crate::detect::{Centroid, Detection};

/// Default minimum safe distance, in pixels.
pub const DEFAULT_MIN_DISTANCE: f64 = 50.0;

/// Symmetric matrix of pairwise Euclidean distances between centroids.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between centroids `i` and `j`. Panics when out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index out of range");
        self.values[i * self.n + j]
    }
}

/// Build the full `n x n` distance matrix.
pub fn pairwise_distances(centroids: &[Centroid]) -> DistanceMatrix {
    let n = centroids.len();
    let mut values = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = centroids[i].distance_to(&centroids[j]);
            values[i * n + j] = d;
            values[j * n + i] = d;
        }
    }
    DistanceMatrix { n, values }
}

/// Indices of detections involved in at least one too-close pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViolationSet(BTreeSet<usize>);

impl ViolationSet {
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    fn insert_pair(&mut self, i: usize, j: usize) {
        self.0.insert(i);
        self.0.insert(j);
    }
}

impl FromIterator<usize> for ViolationSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Classify detections against `min_distance` (pixels).
///
/// A pair `(i, j)` violates when its distance is `< min_distance`; equality is
/// safe. Fewer than two detections short-circuit to an empty set.
pub fn classify_violations(detections: &[Detection], min_distance: f64) -> ViolationSet {
    let mut violations = ViolationSet::default();
    if detections.len() < 2 {
        return violations;
    }

    let centroids: Vec<Centroid> = detections.iter().map(Detection::centroid).collect();
    let distances = pairwise_distances(&centroids);
    for i in 0..distances.len() {
        for j in (i + 1)..distances.len() {
            if distances.get(i, j) < min_distance {
                violations.insert_pair(i, j);
            }
        }
    }
    violations
}
