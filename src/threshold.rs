//! IoU threshold sets for the average threat score.

use crate::error::{BevEvalError, Result};
use serde::{Deserialize, Serialize};

/// Default IoU thresholds, loosest first.
pub const DEFAULT_IOU_THRESHOLDS: [f64; 5] = [0.5, 0.6, 0.7, 0.8, 0.9];

/// An ordered, validated set of IoU thresholds.
///
/// Each threshold `t` is weighted by `1 / t`, so tighter localisation counts
/// for more in the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct IouThresholds(Vec<f64>);

impl Default for IouThresholds {
    fn default() -> Self {
        Self(DEFAULT_IOU_THRESHOLDS.to_vec())
    }
}

impl IouThresholds {
    /// Create a custom threshold set.
    ///
    /// # Errors
    ///
    /// Returns an error if the set is empty or any value lies outside (0.0, 1.0].
    ///
    /// # Example
    ///
    /// ```
    /// use bev_eval::threshold::IouThresholds;
    ///
    /// let thresholds = IouThresholds::new(vec![0.5, 0.75]).unwrap();
    /// assert_eq!(thresholds.weights(), vec![2.0, 1.0 / 0.75]);
    /// assert!(IouThresholds::new(vec![0.0]).is_err());
    /// ```
    pub fn new(thresholds: Vec<f64>) -> Result<Self> {
        if thresholds.is_empty() {
            return Err(BevEvalError::InvalidThreshold(
                "At least one IoU threshold is required".to_string(),
            ));
        }
        for &threshold in &thresholds {
            validate_threshold(threshold)?;
        }
        Ok(Self(thresholds))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inverse-threshold weights, in threshold order.
    pub fn weights(&self) -> Vec<f64> {
        self.0.iter().map(|t| 1.0 / t).collect()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.0.iter().map(|t| 1.0 / t).sum()
    }
}

impl TryFrom<Vec<f64>> for IouThresholds {
    type Error = BevEvalError;

    fn try_from(thresholds: Vec<f64>) -> Result<Self> {
        Self::new(thresholds)
    }
}

impl From<IouThresholds> for Vec<f64> {
    fn from(thresholds: IouThresholds) -> Self {
        thresholds.0
    }
}

/// Validate that an IoU threshold is in the range (0.0, 1.0].
fn validate_threshold(threshold: f64) -> Result<()> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(BevEvalError::InvalidThreshold(format!(
            "IoU threshold must be in (0.0, 1.0], got {threshold}"
        )));
    }
    Ok(())
}
