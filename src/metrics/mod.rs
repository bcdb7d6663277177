//! Metrics for box sets and road masks.

pub mod iou;
pub mod threat_score;
pub mod ats;
pub mod road_map;

pub use iou::{calculate_iou, polygon_iou};
pub use threat_score::{calculate_threat_score, count_true_positives};
pub use ats::{score, AtsReport, AtsScorer, ThresholdScore};
pub use road_map::score_mask;
