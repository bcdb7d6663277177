//! Aggregate configuration for box extraction, filtering and scoring.

use crate::error::Result;
use crate::metrics::ats::AtsScorer;
use crate::segmentation::SegmentationParams;
use crate::threshold::IouThresholds;
use crate::transform::BbSpace;
use crate::vehicle_filter::VehicleFilter;
use serde::{Deserialize, Serialize};

/// All tunable parameters of the pipeline.
///
/// Every section is optional when deserialised and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub bb_space: BbSpace,
    pub segmentation: SegmentationParams,
    pub vehicle_filter: VehicleFilter,
    pub iou_thresholds: IouThresholds,
}

impl EvalConfig {
    /// Parse a config from JSON, filling missing fields with defaults, and validate it.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.bb_space.validate()?;
        self.vehicle_filter.validate()?;
        Ok(())
    }

    /// Scorer using the configured IoU thresholds.
    pub fn scorer(&self) -> AtsScorer {
        AtsScorer::new(self.iou_thresholds.clone())
    }
}
