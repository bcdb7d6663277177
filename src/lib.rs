//! # bev-eval
//!
//! A Rust library for evaluating vehicle detection in a bird's-eye-view
//! perception stack.
//!
//! This library provides:
//! - **Box extraction** from segmentation masks (contour tracing + rectangle fit)
//! - **Rasterisation** of boxes back into a binary mask
//! - **Vehicle post-processing**: size and road-region filtering, splitting of
//!   elongated blobs into vehicle-length boxes
//! - **Polygon IoU** between arbitrary 4-corner boxes
//! - **ATS** (Average Threat Score) over IoU thresholds {0.5, 0.6, 0.7, 0.8, 0.9}
//! - **Road-map threat score** between binary masks
//!
//! ## Coordinate spaces
//!
//! Masks and raw detections live in *pixel space* (origin top-left, y down,
//! 800×800 canvas). Ground-truth boxes usually live in *bounding-box space*
//! (origin at the canvas centre, y up, divided by 10). See [`transform`].
//!
//! ## Quick Start
//!
//! ```rust
//! use bev_eval::metrics::ats::score;
//! use bev_eval::segmentation::extract_boxes;
//! use bev_eval::types::{BoundingBox, BoundingBoxSet};
//! use ndarray::{s, Array2};
//!
//! let mut mask = Array2::<f32>::zeros((100, 100));
//! mask.slice_mut(s![40..60, 10..60]).fill(1.0);
//!
//! let predicted = extract_boxes(&mask, 0.5);
//! let target = BoundingBoxSet::new(vec![BoundingBox::from_rect(10.0, 40.0, 50.0, 20.0)]);
//!
//! let ats = score(&predicted, &target);
//! assert!((ats - 1.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod types;
pub mod transform;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod segmentation;
pub mod vehicle_filter;
pub mod stats;
pub mod synthetic;
pub mod config;
pub mod loader;

// Re-export commonly used types and functions
pub use error::{BevEvalError, Result};
pub use types::{BinaryMask, BoundingBox, BoundingBoxSet, Extent, SegmentationMask};
pub use transform::{from_bb_space, to_bb_space, BbSpace};
pub use threshold::IouThresholds;
pub use metrics::{calculate_iou, score, score_mask, AtsReport, AtsScorer};
pub use segmentation::{extract_boxes, extract_boxes_in_bb_space, rasterize, SegmentationParams};
pub use vehicle_filter::{filter_and_split, FilterInput, VehicleFilter};
pub use stats::FilterStats;
pub use config::EvalConfig;
