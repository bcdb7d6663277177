//! Average threat score (ATS) for predicted vs. target box sets.

use crate::matching::match_targets;
use crate::metrics::threat_score::{calculate_threat_score, count_true_positives};
use crate::threshold::IouThresholds;
use crate::types::BoundingBoxSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Threat score at one IoU threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScore {
    pub threshold: f64,
    pub weight: f64,
    pub true_positives: usize,
    pub threat_score: f64,
}

/// Full breakdown of an ATS evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    /// Weighted average threat score
    pub score: f64,
    pub num_predictions: usize,
    pub num_targets: usize,
    /// Pairs whose extents overlapped and were compared exactly
    pub candidate_pairs: usize,
    pub per_threshold: Vec<ThresholdScore>,
}

/// Scores predicted boxes against targets over a set of IoU thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsScorer {
    pub thresholds: IouThresholds,
}

impl AtsScorer {
    pub fn new(thresholds: IouThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate predictions against targets.
    ///
    /// Every target takes its best IoU over all predictions. At each threshold
    /// the targets strictly above it are true positives, and the threat score
    /// `TP / (P + T - TP)` is computed from counts. The per-threshold scores
    /// are averaged with weights `1 / threshold`.
    ///
    /// With no predictions and no targets there is nothing to miss and nothing
    /// spurious, so the score is 1.0.
    ///
    /// Matching is not one-to-one. When several targets reach their best IoU
    /// through the same prediction, TP can exceed P and the score can rise
    /// above 1.
    pub fn evaluate(&self, predictions: &BoundingBoxSet, targets: &BoundingBoxSet) -> AtsReport {
        let num_predictions = predictions.len();
        let num_targets = targets.len();

        if num_predictions == 0 && num_targets == 0 {
            warn!("ATS evaluated on empty prediction and target sets, returning 1.0");
        }

        let matches = match_targets(predictions.as_slice(), targets.as_slice());

        let per_threshold: Vec<ThresholdScore> = self
            .thresholds
            .as_slice()
            .iter()
            .map(|&threshold| {
                let true_positives = count_true_positives(&matches.best_iou, threshold);
                ThresholdScore {
                    threshold,
                    weight: 1.0 / threshold,
                    true_positives,
                    threat_score: calculate_threat_score(true_positives, num_predictions, num_targets),
                }
            })
            .collect();

        let weighted: f64 = per_threshold.iter().map(|s| s.weight * s.threat_score).sum();
        let score = weighted / self.thresholds.total_weight();

        debug!(
            num_predictions,
            num_targets,
            candidate_pairs = matches.candidate_pairs,
            score,
            "computed average threat score"
        );

        AtsReport {
            score,
            num_predictions,
            num_targets,
            candidate_pairs: matches.candidate_pairs,
            per_threshold,
        }
    }

    /// Weighted average threat score, see [`AtsScorer::evaluate`].
    pub fn score(&self, predictions: &BoundingBoxSet, targets: &BoundingBoxSet) -> f64 {
        self.evaluate(predictions, targets).score
    }
}

/// Average threat score with the default thresholds {0.5, 0.6, 0.7, 0.8, 0.9}.
///
/// The score lies in [0, 1] as long as the true positives at every threshold
/// do not outnumber the predictions. Several targets may share their best
/// prediction, and then TP can exceed P and the score can rise above 1.
///
/// # Example
///
/// ```
/// use bev_eval::metrics::ats::score;
/// use bev_eval::types::{BoundingBox, BoundingBoxSet};
///
/// let boxes = BoundingBoxSet::new(vec![BoundingBox::from_rect(0.0, 0.0, 4.0, 2.0)]);
/// assert!((score(&boxes, &boxes) - 1.0).abs() < 1e-12);
/// ```
pub fn score(predictions: &BoundingBoxSet, targets: &BoundingBoxSet) -> f64 {
    AtsScorer::default().score(predictions, targets)
}
