//! Matching predicted boxes against target boxes.
//!
//! Exact polygon IoU is only evaluated for pairs whose axis-aligned extents
//! overlap. Pairs outside the candidate matrix have an IoU of zero.

use crate::metrics::iou::polygon_iou;
use crate::types::{BoundingBox, Extent};
use geo::Polygon;
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use tracing::debug;

/// Result of matching every target against the full prediction set.
#[derive(Debug, Clone)]
pub struct TargetMatches {
    /// `(P, T)` IoU matrix, zero for non-candidate pairs.
    pub iou_matrix: Array2<f64>,
    /// Highest IoU reached by each target across all predictions.
    pub best_iou: Vec<f64>,
    /// Number of pairs that passed the extent overlap test.
    pub candidate_pairs: usize,
}

/// Build the `(P, T)` candidate matrix from axis-aligned extents.
///
/// `result[[p, t]]` is true when the extents of `predictions[p]` and
/// `targets[t]` overlap on both axes.
pub fn candidate_matrix(predictions: &[BoundingBox], targets: &[BoundingBox]) -> Array2<bool> {
    let pred_extents: Vec<Extent> = predictions.iter().map(BoundingBox::extent).collect();
    let target_extents: Vec<Extent> = targets.iter().map(BoundingBox::extent).collect();

    Array2::from_shape_fn((pred_extents.len(), target_extents.len()), |(p, t)| {
        pred_extents[p].overlaps(&target_extents[t])
    })
}

/// Polygon IoU for every flagged pair of `candidates`, which must be the
/// `(P, T)` matrix built from the same slices.
///
/// Candidate pairs are evaluated in parallel; the result does not depend on
/// scheduling.
fn candidate_iou_matrix(
    predictions: &[BoundingBox],
    targets: &[BoundingBox],
    candidates: &Array2<bool>,
) -> Array2<f64> {
    let mut iou_matrix = Array2::zeros(candidates.dim());

    let pairs: Vec<(usize, usize)> = candidates
        .indexed_iter()
        .filter_map(|(idx, &flag)| flag.then_some(idx))
        .collect();
    if pairs.is_empty() {
        return iou_matrix;
    }

    let pred_hulls: Vec<Polygon<f64>> = predictions.par_iter().map(BoundingBox::hull).collect();
    let target_hulls: Vec<Polygon<f64>> = targets.par_iter().map(BoundingBox::hull).collect();

    let ious: Vec<f64> = pairs
        .par_iter()
        .map(|&(p, t)| polygon_iou(&pred_hulls[p], &target_hulls[t]))
        .collect();

    for (&(p, t), iou) in pairs.iter().zip(ious) {
        iou_matrix[[p, t]] = iou;
    }
    iou_matrix
}

/// Highest IoU per target (column maximum). Targets with no predictions get 0.0.
///
/// This is not a one-to-one assignment: several targets may reach their best
/// IoU through the same prediction.
pub fn best_iou_per_target(iou_matrix: &Array2<f64>) -> Vec<f64> {
    iou_matrix
        .axis_iter(Axis(1))
        .map(|column| column.iter().copied().fold(0.0, f64::max))
        .collect()
}

/// Match every target against the prediction set.
pub fn match_targets(predictions: &[BoundingBox], targets: &[BoundingBox]) -> TargetMatches {
    let candidates = candidate_matrix(predictions, targets);
    let candidate_pairs = candidates.iter().filter(|&&flag| flag).count();
    let iou_matrix = candidate_iou_matrix(predictions, targets, &candidates);
    let best_iou = best_iou_per_target(&iou_matrix);

    debug!(
        predictions = predictions.len(),
        targets = targets.len(),
        candidate_pairs,
        "matched targets against predictions"
    );

    TargetMatches {
        iou_matrix,
        best_iou,
        candidate_pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_candidate_matrix() {
        let predictions = vec![
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(100.0, 100.0, 10.0, 10.0),
        ];
        let targets = vec![
            BoundingBox::from_rect(5.0, 5.0, 10.0, 10.0),
            BoundingBox::from_rect(10.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(105.0, 95.0, 10.0, 10.0),
        ];

        let candidates = candidate_matrix(&predictions, &targets);
        assert_eq!(candidates.dim(), (2, 3));
        assert!(candidates[[0, 0]]);
        // Shared edge only
        assert!(!candidates[[0, 1]]);
        assert!(!candidates[[0, 2]]);
        assert!(candidates[[1, 2]]);
    }

    #[test]
    fn test_best_iou_per_target() {
        let predictions = vec![
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(5.0, 5.0, 10.0, 10.0),
        ];
        let targets = vec![
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(50.0, 50.0, 10.0, 10.0),
        ];

        let matches = match_targets(&predictions, &targets);
        assert_eq!(matches.candidate_pairs, 2);
        assert_abs_diff_eq!(matches.best_iou[0], 1.0, epsilon = 1e-6);
        assert_eq!(matches.best_iou[1], 0.0);
        assert_abs_diff_eq!(matches.iou_matrix[[1, 0]], 25.0 / 175.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shared_prediction() {
        // One large prediction covering two identical targets
        let predictions = vec![BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0)];
        let targets = vec![
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
        ];
        let matches = match_targets(&predictions, &targets);
        assert!(matches.best_iou.iter().all(|&iou| iou > 0.99));
    }

    #[test]
    fn test_iou_matrix_shape_follows_inputs() {
        let predictions = vec![
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(100.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(200.0, 0.0, 10.0, 10.0),
        ];
        let targets = vec![
            BoundingBox::from_rect(200.0, 0.0, 10.0, 10.0),
            BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0),
        ];

        let matches = match_targets(&predictions, &targets);
        assert_eq!(matches.iou_matrix.dim(), (3, 2));
        assert_eq!(matches.candidate_pairs, 2);
        assert_abs_diff_eq!(matches.iou_matrix[[2, 0]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(matches.iou_matrix[[0, 1]], 1.0, epsilon = 1e-6);
        assert_eq!(matches.iou_matrix[[1, 0]], 0.0);
        assert_eq!(matches.best_iou.len(), 2);
    }

    #[test]
    fn test_empty_predictions() {
        let targets = vec![BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0)];
        let matches = match_targets(&[], &targets);
        assert_eq!(matches.iou_matrix.dim(), (0, 1));
        assert_eq!(matches.best_iou, vec![0.0]);
        assert_eq!(matches.candidate_pairs, 0);
    }
}
