//! Clustering routines: seeded K-means (plain and sample-weighted) and Ward
//! agglomerative clustering.
//!
//! # Determinism
//!
//! All randomness flows through a `SmallRng` seeded explicitly by the caller;
//! [`KMEANS_SEED`] is the framework-wide default.  Given the same seed and
//! input, labels and centres are bit-identical between runs.  Ties (equal
//! distances, equal cluster sums) always resolve to the lowest index.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use gs_core::GeoPoint;

use crate::{SpatialError, SpatialResult};

/// Default seed for reproducible clustering runs.
pub const KMEANS_SEED: u64 = 0;

/// Lloyd iterations cap; assignment usually stabilises long before this.
const MAX_ITERATIONS: usize = 300;

/// A cluster of geographic points and its centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub center: GeoPoint,
    pub points: Vec<GeoPoint>,
}

/// Partition `points` into `k` groups with seeded K-means.
///
/// Group order follows label order; every input point appears in exactly one
/// group.  Fails with `InvalidInput` when `k` is zero or exceeds the number
/// of points.
pub fn kmeans_clusters(k: usize, points: &[GeoPoint]) -> SpatialResult<Vec<Group>> {
    let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.lon, p.lat]).collect();
    let (labels, centers) = lloyd(&coords, None, k, KMEANS_SEED)?;

    let mut groups: Vec<Group> = centers
        .iter()
        .map(|c| Group {
            center: GeoPoint::new(c[0], c[1]),
            points: Vec::new(),
        })
        .collect();
    for (point, label) in points.iter().zip(&labels) {
        groups[*label].points.push(*point);
    }
    Ok(groups)
}

/// Sample-weighted K-means labels for arbitrary 2-D features.
///
/// Used by the phase mapper to balance transformer allocation by capacity:
/// weights skew both the k-means++ seeding distribution and the centroid
/// update.
pub fn weighted_kmeans_labels(
    points: &[[f64; 2]],
    weights: Option<&[f64]>,
    k: usize,
    seed: u64,
) -> SpatialResult<Vec<usize>> {
    let (labels, _) = lloyd(points, weights, k, seed)?;
    Ok(labels)
}

// ── Lloyd's algorithm with k-means++ seeding ──────────────────────────────────

fn lloyd(
    points: &[[f64; 2]],
    weights: Option<&[f64]>,
    k: usize,
    seed: u64,
) -> SpatialResult<(Vec<usize>, Vec<[f64; 2]>)> {
    if k == 0 || k > points.len() {
        return Err(SpatialError::InvalidInput(format!(
            "cannot form {k} clusters from {} points",
            points.len()
        )));
    }
    if let Some(w) = weights {
        if w.len() != points.len() {
            return Err(SpatialError::InvalidInput(format!(
                "{} weights supplied for {} points",
                w.len(),
                points.len()
            )));
        }
        if w.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SpatialError::InvalidInput(
                "sample weights must be finite and non-negative".into(),
            ));
        }
    }

    let weight_of = |i: usize| weights.map_or(1.0, |w| w[i]);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut centers = init_plus_plus(points, weights, k, &mut rng);

    let mut labels = vec![0usize; points.len()];
    for _ in 0..MAX_ITERATIONS {
        // Assignment step: nearest centre, lowest index on ties.
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let nearest = nearest_center(p, &centers);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        // Update step: weighted centroid per cluster.
        let mut sums = vec![[0.0f64; 2]; k];
        let mut totals = vec![0.0f64; k];
        for (i, p) in points.iter().enumerate() {
            let w = weight_of(i);
            sums[labels[i]][0] += p[0] * w;
            sums[labels[i]][1] += p[1] * w;
            totals[labels[i]] += w;
        }
        for c in 0..k {
            if totals[c] > 0.0 {
                centers[c] = [sums[c][0] / totals[c], sums[c][1] / totals[c]];
            } else {
                // Empty cluster: restart it at the point farthest from its
                // assigned centre so the next sweep can claim members.
                let outlier = farthest_point(points, &centers, &labels);
                centers[c] = points[outlier];
            }
        }

        if !changed {
            break;
        }
    }

    Ok((labels, centers))
}

fn init_plus_plus(
    points: &[[f64; 2]],
    weights: Option<&[f64]>,
    k: usize,
    rng: &mut SmallRng,
) -> Vec<[f64; 2]> {
    let weight_of = |i: usize| weights.map_or(1.0, |w| w[i]);

    let mut centers: Vec<[f64; 2]> = Vec::with_capacity(k);
    centers.push(points[sample_index(
        &points.iter().enumerate().map(|(i, _)| weight_of(i)).collect::<Vec<_>>(),
        rng,
    )]);

    while centers.len() < k {
        let scores: Vec<f64> = points
            .iter()
            .enumerate()
            .map(|(i, p)| weight_of(i) * min_distance_sq(p, &centers))
            .collect();
        if scores.iter().sum::<f64>() > 0.0 {
            centers.push(points[sample_index(&scores, rng)]);
        } else {
            // All remaining mass sits on existing centres (duplicate points);
            // fall back to the first point not already chosen.
            let next = points
                .iter()
                .position(|p| !centers.contains(p))
                .unwrap_or(centers.len());
            centers.push(points[next]);
        }
    }
    centers
}

/// Draw an index proportionally to `scores` (all non-negative, sum > 0).
fn sample_index(scores: &[f64], rng: &mut SmallRng) -> usize {
    let total: f64 = scores.iter().sum();
    let mut r = rng.r#gen::<f64>() * total;
    for (i, s) in scores.iter().enumerate() {
        r -= s;
        if r <= 0.0 {
            return i;
        }
    }
    scores.len() - 1
}

#[inline]
fn distance_sq(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn min_distance_sq(p: &[f64; 2], centers: &[[f64; 2]]) -> f64 {
    centers
        .iter()
        .map(|c| distance_sq(p, c))
        .fold(f64::INFINITY, f64::min)
}

fn nearest_center(p: &[f64; 2], centers: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let d = distance_sq(p, center);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn farthest_point(points: &[[f64; 2]], centers: &[[f64; 2]], labels: &[usize]) -> usize {
    let mut best = 0;
    let mut best_d = -1.0;
    for (i, p) in points.iter().enumerate() {
        let d = distance_sq(p, &centers[labels[i]]);
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

// ── Ward agglomerative clustering ─────────────────────────────────────────────

/// Ward-linkage agglomerative clustering down to `k` clusters.
///
/// Merge cost between clusters A and B is the Ward increase in within-cluster
/// variance, `|A||B| / (|A|+|B|) · ‖c_A − c_B‖²`; the minimal pair merges
/// first, ties resolving to the smallest index pair.  Labels are numbered by
/// each final cluster's smallest member index.
pub fn ward_labels(features: &[Vec<f64>], k: usize) -> SpatialResult<Vec<usize>> {
    let n = features.len();
    if k == 0 || k > n {
        return Err(SpatialError::InvalidInput(format!(
            "cannot form {k} clusters from {n} observations"
        )));
    }
    let dim = features.first().map_or(0, Vec::len);
    if features.iter().any(|f| f.len() != dim) {
        return Err(SpatialError::InvalidInput(
            "observations must share a feature dimension".into(),
        ));
    }

    struct Cluster {
        members: Vec<usize>,
        centroid: Vec<f64>,
        size: f64,
    }

    let mut clusters: Vec<Cluster> = features
        .iter()
        .enumerate()
        .map(|(i, f)| Cluster {
            members: vec![i],
            centroid: f.clone(),
            size: 1.0,
        })
        .collect();

    let ward_cost = |a: &Cluster, b: &Cluster| {
        let gap: f64 = a
            .centroid
            .iter()
            .zip(&b.centroid)
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        a.size * b.size / (a.size + b.size) * gap
    };

    while clusters.len() > k {
        let mut best = (0usize, 1usize);
        let mut best_cost = f64::INFINITY;
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let cost = ward_cost(&clusters[i], &clusters[j]);
                if cost < best_cost {
                    best_cost = cost;
                    best = (i, j);
                }
            }
        }

        let absorbed = clusters.remove(best.1);
        let host = &mut clusters[best.0];
        let merged_size = host.size + absorbed.size;
        for (d, c) in host.centroid.iter_mut().enumerate() {
            *c = (*c * host.size + absorbed.centroid[d] * absorbed.size) / merged_size;
        }
        host.size = merged_size;
        host.members.extend(absorbed.members);
    }

    // Number clusters by their smallest member for stable output.
    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by_key(|&c| clusters[c].members.iter().min().copied());

    let mut labels = vec![0usize; n];
    for (label, &c) in order.iter().enumerate() {
        for &m in &clusters[c].members {
            labels[m] = label;
        }
    }
    Ok(labels)
}
