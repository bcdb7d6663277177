//! Threat score calculation.

/// Calculate the threat score from box counts.
///
/// The threat score is a Jaccard index over counts:
/// TS = TP / (P + T - TP)
///
/// Missed targets and unmatched predictions both enlarge the denominator, so
/// they are penalised symmetrically.
///
/// # Arguments
///
/// * `true_positives` - Number of targets matched above the IoU threshold
/// * `num_predictions` - Number of predicted boxes (P)
/// * `num_targets` - Number of target boxes (T)
///
/// # Returns
///
/// Returns the threat score. When the denominator is zero, which only
/// happens with no predictions and no targets, the score is 1.0.
///
/// # Example
///
/// ```
/// use bev_eval::metrics::threat_score::calculate_threat_score;
///
/// let ts = calculate_threat_score(3, 4, 5);
/// assert!((ts - 0.5).abs() < 1e-12);
/// ```
pub fn calculate_threat_score(true_positives: usize, num_predictions: usize, num_targets: usize) -> f64 {
    let denominator = (num_predictions + num_targets).saturating_sub(true_positives);
    if denominator == 0 {
        return 1.0;
    }

    true_positives as f64 / denominator as f64
}

/// Count the targets whose best IoU strictly exceeds `threshold`.
pub fn count_true_positives(best_iou: &[f64], threshold: f64) -> usize {
    best_iou.iter().filter(|&&iou| iou > threshold).count()
}
