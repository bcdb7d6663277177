//! Intersection over Union (IoU) calculation for quadrilateral boxes.

use crate::types::BoundingBox;
use geo::{Area, BooleanOps, Polygon};

/// Calculate the Intersection over Union (IoU) between two boxes.
///
/// Each box is replaced by the convex hull of its four corners, so the result
/// does not depend on corner ordering. A hull with zero area (collinear or
/// repeated corners) has no overlap with anything and yields 0.0.
///
/// # Example
///
/// ```
/// use bev_eval::metrics::iou::calculate_iou;
/// use bev_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0);
/// let bbox2 = BoundingBox::from_rect(5.0, 5.0, 10.0, 10.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    polygon_iou(&bbox1.hull(), &bbox2.hull())
}

/// IoU of two polygons, assumed convex and hole-free.
pub fn polygon_iou(poly1: &Polygon<f64>, poly2: &Polygon<f64>) -> f64 {
    let area1 = poly1.unsigned_area();
    let area2 = poly2.unsigned_area();

    // Degenerate hulls are kept away from the clipper entirely
    if area1 <= 0.0 || area2 <= 0.0 {
        return 0.0;
    }

    let intersection_area = poly1.intersection(poly2).unsigned_area();
    let union_area = area1 + area2 - intersection_area;

    if union_area <= 0.0 {
        return 0.0;
    }

    (intersection_area / union_area).clamp(0.0, 1.0)
}
