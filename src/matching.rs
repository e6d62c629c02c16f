//! Detection-to-identity matching algorithms.

use nalgebra::{DMatrix, Point2};
use serde::{Deserialize, Serialize};

use crate::Detection;

/// How detections are associated with tracked identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Each detection, in input order, takes the first still-unclaimed
    /// identity (in insertion order) within the threshold, even if a closer
    /// one exists.
    #[default]
    FirstMatch,

    /// Greedy global minimum-distance assignment: pairs are taken in order of
    /// ascending distance, each detection and identity used at most once.
    Nearest,
}

impl MatchPolicy {
    /// Match detections to identities with this policy.
    ///
    /// See [`match_first`] and [`match_nearest`].
    pub fn match_detections(
        &self,
        distance_matrix: &DMatrix<f64>,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        match self {
            MatchPolicy::FirstMatch => match_first(distance_matrix, threshold),
            MatchPolicy::Nearest => match_nearest(distance_matrix, threshold),
        }
    }
}

/// Build the Euclidean distance matrix between detections and identity positions.
///
/// # Returns
/// Matrix of shape (n_detections, n_identities). Entry (i, j) is the distance
/// between detection i and identity j.
pub fn distance_matrix(detections: &[Detection], positions: &[Point2<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(detections.len(), positions.len(), |i, j| {
        nalgebra::distance(&detections[i].position, &positions[j])
    })
}

/// First-match association.
///
/// Detections are visited in row order; each takes the lowest-index column
/// that is unclaimed and strictly closer than `threshold`.
///
/// # Returns
/// Tuple of (matched_det_indices, matched_obj_indices) where entry i indicates
/// the matched pair, in detection order.
pub fn match_first(distance_matrix: &DMatrix<f64>, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let n_detections = distance_matrix.nrows();
    let n_objects = distance_matrix.ncols();

    let mut used_objs = vec![false; n_objects];
    let mut matched_dets = Vec::new();
    let mut matched_objs = Vec::new();

    for det_idx in 0..n_detections {
        let candidate = (0..n_objects)
            .find(|&obj_idx| !used_objs[obj_idx] && distance_matrix[(det_idx, obj_idx)] < threshold);

        if let Some(obj_idx) = candidate {
            used_objs[obj_idx] = true;
            matched_dets.push(det_idx);
            matched_objs.push(obj_idx);
        }
    }

    (matched_dets, matched_objs)
}

/// Greedy minimum-distance association.
///
/// # Arguments
/// * `distance_matrix` - Distance matrix (n_detections x n_objects)
/// * `threshold` - Pairs must be strictly closer than this
///
/// # Returns
/// Tuple of (matched_det_indices, matched_obj_indices) in order of ascending
/// distance. Ties keep row-major order.
pub fn match_nearest(distance_matrix: &DMatrix<f64>, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let n_detections = distance_matrix.nrows();
    let n_objects = distance_matrix.ncols();

    if n_detections == 0 || n_objects == 0 {
        return (Vec::new(), Vec::new());
    }

    // Collect all valid (distance, det_idx, obj_idx) pairs
    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n_detections {
        for j in 0..n_objects {
            let dist = distance_matrix[(i, j)];
            if dist.is_finite() && dist < threshold {
                pairs.push((dist, i, j));
            }
        }
    }

    // Stable sort keeps row-major order among equal distances
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut used_dets = vec![false; n_detections];
    let mut used_objs = vec![false; n_objects];

    let mut matched_dets = Vec::new();
    let mut matched_objs = Vec::new();

    for (_dist, det_idx, obj_idx) in pairs {
        if used_dets[det_idx] || used_objs[obj_idx] {
            continue;
        }

        matched_dets.push(det_idx);
        matched_objs.push(obj_idx);
        used_dets[det_idx] = true;
        used_objs[obj_idx] = true;
    }

    (matched_dets, matched_objs)
}

/// Get unmatched indices from a match result.
pub fn get_unmatched(total: usize, matched: &[usize]) -> Vec<usize> {
    let mut is_matched = vec![false; total];
    for &idx in matched {
        is_matched[idx] = true;
    }
    (0..total).filter(|&i| !is_matched[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ===== Distance Matrix =====

    #[test]
    fn test_distance_matrix_shape_and_values() {
        let detections = vec![
            Detection::new(0.0, 0.0).unwrap(),
            Detection::new(3.0, 4.0).unwrap(),
        ];
        let positions = vec![Point2::new(0.0, 0.0), Point2::new(6.0, 8.0), Point2::new(0.0, 4.0)];

        let matrix = distance_matrix(&detections, &positions);

        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix.ncols(), 3);
        assert_relative_eq!(matrix[(0, 0)], 0.0);
        assert_relative_eq!(matrix[(0, 1)], 10.0);
        assert_relative_eq!(matrix[(1, 0)], 5.0);
        assert_relative_eq!(matrix[(1, 2)], 3.0);
    }

    // ===== First Match =====

    #[test]
    fn test_first_match_ignores_closer_candidate() {
        // Detection 0 is within threshold of both objects; object 0 comes first
        let matrix = DMatrix::from_row_slice(1, 2, &[
            90.0, 5.0,
        ]);
        let (dets, objs) = match_first(&matrix, 100.0);

        assert_eq!(dets, vec![0]);
        assert_eq!(objs, vec![0]);
    }

    #[test]
    fn test_first_match_claims_object_once() {
        // Both detections are near object 0; the first detection claims it
        let matrix = DMatrix::from_row_slice(2, 1, &[
            40.0,
            2.0,
        ]);
        let (dets, objs) = match_first(&matrix, 100.0);

        assert_eq!(dets, vec![0]);
        assert_eq!(objs, vec![0]);
        assert_eq!(get_unmatched(2, &dets), vec![1]);
    }

    #[test]
    fn test_first_match_falls_through_to_next_object() {
        let matrix = DMatrix::from_row_slice(2, 2, &[
            10.0, 20.0,
            10.0, 20.0,
        ]);
        let (dets, objs) = match_first(&matrix, 100.0);

        assert_eq!(dets, vec![0, 1]);
        assert_eq!(objs, vec![0, 1]);
    }

    #[test]
    fn test_first_match_threshold_is_strict() {
        let matrix = DMatrix::from_row_slice(1, 1, &[100.0]);
        let (dets, objs) = match_first(&matrix, 100.0);

        assert!(dets.is_empty());
        assert!(objs.is_empty());
    }

    // ===== Nearest =====

    #[test]
    fn test_nearest_perfect_matches() {
        let matrix = DMatrix::from_row_slice(3, 3, &[
            0.5, 0.9, 0.8,
            0.9, 0.3, 0.7,
            0.8, 0.7, 0.4,
        ]);
        let (dets, objs) = match_nearest(&matrix, 1.0);

        // Greedy order: [1,1]=0.3, [2,2]=0.4, [0,0]=0.5
        assert_eq!(dets, vec![1, 2, 0]);
        assert_eq!(objs, vec![1, 2, 0]);
    }

    #[test]
    fn test_nearest_prefers_closer_detection() {
        // Both detections near object 0; detection 1 is closer and wins
        let matrix = DMatrix::from_row_slice(2, 1, &[
            40.0,
            2.0,
        ]);
        let (dets, objs) = match_nearest(&matrix, 100.0);

        assert_eq!(dets, vec![1]);
        assert_eq!(objs, vec![0]);
    }

    #[test]
    fn test_nearest_all_above_threshold() {
        let matrix = DMatrix::from_row_slice(2, 2, &[
            5.0, 6.0,
            7.0, 8.0,
        ]);
        let (dets, objs) = match_nearest(&matrix, 3.0);

        assert!(dets.is_empty());
        assert!(objs.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let matrix = DMatrix::<f64>::zeros(0, 3);
        assert_eq!(match_first(&matrix, 1.0), (vec![], vec![]));
        assert_eq!(match_nearest(&matrix, 1.0), (vec![], vec![]));

        let matrix = DMatrix::<f64>::zeros(2, 0);
        assert_eq!(match_first(&matrix, 1.0), (vec![], vec![]));
        assert_eq!(match_nearest(&matrix, 1.0), (vec![], vec![]));
    }

    #[test]
    fn test_policy_dispatch() {
        let matrix = DMatrix::from_row_slice(1, 2, &[
            90.0, 5.0,
        ]);

        assert_eq!(MatchPolicy::FirstMatch.match_detections(&matrix, 100.0).1, vec![0]);
        assert_eq!(MatchPolicy::Nearest.match_detections(&matrix, 100.0).1, vec![1]);
    }

    #[test]
    fn test_get_unmatched() {
        assert_eq!(get_unmatched(4, &[2, 0]), vec![1, 3]);
        assert!(get_unmatched(2, &[0, 1]).is_empty());
    }
}
