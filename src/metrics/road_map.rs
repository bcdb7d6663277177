//! Pixel-set IoU for road-map segmentation masks.

use crate::error::{BevEvalError, Result};
use ndarray::{ArrayBase, Data, Ix2};
use tracing::warn;

/// Threat score between two binary road masks: `|A ∩ B| / |A ∪ B|`.
///
/// Any nonzero pixel counts as road. When neither mask contains road the
/// score is 1.0.
///
/// # Errors
///
/// Returns `ShapeError` if the masks do not have the same dimensions.
///
/// # Example
///
/// ```
/// use bev_eval::metrics::road_map::score_mask;
/// use ndarray::array;
///
/// let a = array![[1u8, 1], [0, 0]];
/// let b = array![[1u8, 0], [1, 0]];
/// let ts = score_mask(&a, &b).unwrap();
/// assert!((ts - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn score_mask<S1, S2>(mask_a: &ArrayBase<S1, Ix2>, mask_b: &ArrayBase<S2, Ix2>) -> Result<f64>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    if mask_a.dim() != mask_b.dim() {
        return Err(BevEvalError::ShapeError(format!(
            "Road masks must have the same shape, got {:?} and {:?}",
            mask_a.dim(),
            mask_b.dim()
        )));
    }

    let mut intersection = 0usize;
    let mut sum_a = 0usize;
    let mut sum_b = 0usize;
    for (&a, &b) in mask_a.iter().zip(mask_b.iter()) {
        let (a, b) = (a != 0, b != 0);
        sum_a += usize::from(a);
        sum_b += usize::from(b);
        intersection += usize::from(a && b);
    }

    let union = sum_a + sum_b - intersection;
    if union == 0 {
        warn!("road map score evaluated on two empty masks, returning 1.0");
        return Ok(1.0);
    }

    Ok(intersection as f64 / union as f64)
}
