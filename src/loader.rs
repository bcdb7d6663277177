//! JSON parsing for configuration and box sets.
//!
//! Only in-memory strings are parsed; reading files is left to the caller.

use crate::config::EvalConfig;
use crate::error::Result;
use crate::types::{BoundingBox, BoundingBoxSet};

/// Parse and validate an [`EvalConfig`] from a JSON string.
///
/// Missing sections and fields take their default values.
///
/// # Errors
///
/// Returns an error if the JSON cannot be parsed, a threshold is invalid, or
/// a value fails validation.
///
/// # Example
///
/// ```
/// use bev_eval::loader::load_config_from_string;
///
/// let json = r#"{
///     "vehicle_filter": { "len_x": 40.0 },
///     "iou_thresholds": [0.5, 0.75]
/// }"#;
/// let config = load_config_from_string(json).unwrap();
/// assert_eq!(config.vehicle_filter.len_x, 40.0);
/// assert_eq!(config.vehicle_filter.max_y_coord, 600.0);
/// assert_eq!(config.iou_thresholds.len(), 2);
/// ```
pub fn load_config_from_string(json_str: &str) -> Result<EvalConfig> {
    EvalConfig::from_json_str(json_str)
}

/// Parse boxes stored as a `(count, 2, 4)` nested array.
///
/// Each entry is `[[x0, x1, x2, x3], [y0, y1, y2, y3]]`.
///
/// # Example
///
/// ```
/// use bev_eval::loader::load_boxes_from_string;
///
/// let json = "[[[15, 15, 5, 5], [12, 32, 12, 32]]]";
/// let boxes = load_boxes_from_string(json).unwrap();
/// assert_eq!(boxes.len(), 1);
/// assert_eq!(boxes.as_slice()[0].width(), 10.0);
/// ```
pub fn load_boxes_from_string(json_str: &str) -> Result<BoundingBoxSet> {
    let raw: Vec<[[f64; 4]; 2]> = serde_json::from_str(json_str)?;
    Ok(raw
        .into_iter()
        .map(|[xs, ys]| BoundingBox::new(xs, ys))
        .collect())
}

/// Serialise boxes to the `(count, 2, 4)` nested array layout.
pub fn boxes_to_string(boxes: &BoundingBoxSet) -> Result<String> {
    let raw: Vec<[[f64; 4]; 2]> = boxes.iter().map(|b| [b.xs, b.ys]).collect();
    Ok(serde_json::to_string(&raw)?)
}
