//! Conversion between segmentation masks and bounding boxes.
//!
//! [`extract_boxes`] turns a probability mask into one axis-aligned box per
//! connected foreground blob. [`rasterize`] goes the other way, painting a
//! set of bb-space boxes onto a binary canvas.

use crate::transform::BbSpace;
use crate::types::{BinaryMask, BoundingBox, BoundingBoxSet, Extent};
use geo::{Coord, Line, Polygon};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;
use ndarray::{Array2, ArrayBase, Data, Ix2, Zip};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for box extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Pixels strictly above this value are foreground
    pub threshold: f32,
    /// Douglas-Peucker tolerance in pixels applied to each contour
    pub simplify_epsilon: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            simplify_epsilon: 3.0,
        }
    }
}

/// Extract pixel-space boxes from a mask using the default contour tolerance.
///
/// See [`extract_boxes_with`].
pub fn extract_boxes<S>(mask: &ArrayBase<S, Ix2>, threshold: f32) -> BoundingBoxSet
where
    S: Data<Elem = f32>,
{
    extract_boxes_with(
        mask,
        &SegmentationParams {
            threshold,
            ..SegmentationParams::default()
        },
    )
}

/// Extract one box per connected foreground blob.
///
/// The mask is binarised at `params.threshold`, the outermost border of each
/// blob is traced (holes and blobs nested inside holes are ignored), the
/// border is simplified, and its bounding rectangle `(x, y, w, h)` becomes a
/// box with corners `[(x+w, y), (x+w, y+h), (x, y), (x, y+h)]`. Width and
/// height count pixels, so a blob covering columns `c..=c+9` has `w = 10`.
pub fn extract_boxes_with<S>(mask: &ArrayBase<S, Ix2>, params: &SegmentationParams) -> BoundingBoxSet
where
    S: Data<Elem = f32>,
{
    let (rows, cols) = mask.dim();
    if rows == 0 || cols == 0 {
        return BoundingBoxSet::empty();
    }

    let binary = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if mask[[y as usize, x as usize]] > params.threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    let contours: Vec<Contour<u32>> = find_contours(&binary);
    let boxes: BoundingBoxSet = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| bounding_rect(&simplify(&c.points, params.simplify_epsilon)))
        .collect();

    debug!(
        contours = contours.len(),
        boxes = boxes.len(),
        threshold = params.threshold,
        "extracted boxes from mask"
    );
    boxes
}

/// Extract boxes and convert them into bb-space.
///
/// Boxes no larger than one bb-space unit along either axis are dropped.
pub fn extract_boxes_in_bb_space<S>(mask: &ArrayBase<S, Ix2>, threshold: f32, space: &BbSpace) -> BoundingBoxSet
where
    S: Data<Elem = f32>,
{
    extract_boxes(mask, threshold)
        .iter()
        .map(|b| space.box_to_bb(b))
        .filter(|b| b.width() > 1.0 && b.height() > 1.0)
        .collect()
}

/// Paint bb-space boxes onto a `canvas_height × canvas_width` binary mask.
///
/// Pixel `(row, col)` sits at bb-space point
/// `((col - W/2) / scale, (H/2 - row) / scale)` and is set to 1 when it lies
/// inside any box's outline, the corners joined in the order 0, 1, 3, 2.
/// Membership uses the even-odd rule with half-open edges: a pixel on a
/// left or top edge (in pixel space) is inside, one on a right or bottom
/// edge is not. An integer-aligned `w × h` pixel box therefore paints exactly
/// `w × h` pixels, and adjacent boxes neither overlap nor leave a gap.
/// Overlapping boxes merge; the mask does not identify instances.
pub fn rasterize(boxes: &BoundingBoxSet, canvas_height: usize, canvas_width: usize, scale: f64) -> BinaryMask {
    let space = BbSpace::new(canvas_width as f64, canvas_height as f64, scale);

    // Outlines and extents in pixel coordinates
    let shapes: Vec<(Polygon<f64>, Extent)> = boxes
        .iter()
        .map(|b| {
            let pixel_box = space.box_from_bb(b);
            (pixel_box.polygon(), pixel_box.extent())
        })
        .collect();

    let mut out: BinaryMask = Array2::zeros((canvas_height, canvas_width));
    if shapes.is_empty() {
        return out;
    }

    Zip::indexed(&mut out).par_for_each(|(row, col), pixel| {
        let point = Coord {
            x: col as f64,
            y: row as f64,
        };
        let inside = shapes.iter().any(|(outline, extent)| {
            point.x >= extent.min_x
                && point.x < extent.max_x
                && point.y >= extent.min_y
                && point.y < extent.max_y
                && contains_half_open(outline, point)
        });
        if inside {
            *pixel = 1;
        }
    });

    debug!(
        boxes = boxes.len(),
        canvas_height,
        canvas_width,
        "rasterized boxes"
    );
    out
}

/// Even-odd crossing test against the exterior ring of `outline`.
///
/// Edges count on `[min_y, max_y)` and a crossing is taken when the point lies
/// strictly left of the edge, so points on the ring's low-x and low-y sides
/// are inside and points on the high sides are outside.
fn contains_half_open(outline: &Polygon<f64>, point: Coord<f64>) -> bool {
    outline
        .exterior()
        .lines()
        .filter(|line| (line.start.y > point.y) != (line.end.y > point.y))
        .filter(|line| {
            let Line { start, end } = *line;
            let cross_x = start.x + (point.y - start.y) * (end.x - start.x) / (end.y - start.y);
            point.x < cross_x
        })
        .count()
        % 2
        == 1
}

fn simplify(points: &[PixelPoint<u32>], epsilon: f64) -> Vec<PixelPoint<u32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }
    approximate_polygon_dp(points, epsilon, true)
}

fn bounding_rect(points: &[PixelPoint<u32>]) -> Option<BoundingBox> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    Some(BoundingBox::from_rect(
        f64::from(min_x),
        f64::from(min_y),
        f64::from(max_x - min_x + 1),
        f64::from(max_y - min_y + 1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array2};

    fn mask_with_rects(rows: usize, cols: usize, rects: &[(usize, usize, usize, usize)]) -> Array2<f32> {
        let mut mask = Array2::zeros((rows, cols));
        for &(x, y, w, h) in rects {
            mask.slice_mut(s![y..y + h, x..x + w]).fill(1.0);
        }
        mask
    }

    #[test]
    fn test_single_rectangle() {
        let mask = mask_with_rects(60, 60, &[(5, 12, 10, 20)]);
        let boxes = extract_boxes(&mask, 0.5);
        assert_eq!(boxes.len(), 1);
        let bbox = boxes.as_slice()[0];
        assert_eq!(bbox.xs, [15.0, 15.0, 5.0, 5.0]);
        assert_eq!(bbox.ys, [12.0, 32.0, 12.0, 32.0]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut mask = Array2::<f32>::zeros((10, 10));
        mask.slice_mut(s![2..5, 2..5]).fill(0.5);
        assert!(extract_boxes(&mask, 0.5).is_empty());
        assert_eq!(extract_boxes(&mask, 0.4).len(), 1);
    }

    #[test]
    fn test_empty_mask() {
        let mask = Array2::<f32>::zeros((20, 20));
        assert!(extract_boxes(&mask, 0.5).is_empty());
        assert!(extract_boxes(&Array2::<f32>::zeros((0, 0)), 0.5).is_empty());
    }

    #[test]
    fn test_hole_and_nested_blob_ignored() {
        // Ring with a blob inside its hole: only the ring is reported
        let mut mask = mask_with_rects(40, 40, &[(5, 5, 30, 30)]);
        mask.slice_mut(s![10..30, 10..30]).fill(0.0);
        mask.slice_mut(s![18..22, 18..22]).fill(1.0);

        let boxes = extract_boxes(&mask, 0.5);
        assert_eq!(boxes.len(), 1);
        let extent = boxes.as_slice()[0].extent();
        assert_eq!((extent.min_x, extent.max_x), (5.0, 35.0));
    }

    #[test]
    fn test_blob_touching_border() {
        let mask = mask_with_rects(20, 20, &[(0, 0, 6, 4)]);
        let boxes = extract_boxes(&mask, 0.5);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes.as_slice()[0].xs, [6.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rasterize_single_box() {
        // bb-space box from (-1, -1) to (1, 1) at scale 2: pixels 4..8 on a 12x12 canvas
        let boxes = BoundingBoxSet::new(vec![BoundingBox::from_rect(-1.0, -1.0, 2.0, 2.0)]);
        let mask = rasterize(&boxes, 12, 12, 2.0);
        assert_eq!(mask.sum(), 16);
        assert_eq!(mask.slice(s![4..8, 4..8]).sum(), 16);
        assert_eq!(mask[[4, 4]], 1);
        assert_eq!(mask[[8, 6]], 0);
        assert_eq!(mask[[6, 8]], 0);
    }

    #[test]
    fn test_rasterize_follows_ring_not_hull() {
        // Dart: ring (-4, -4) -> (0, 4) -> (4, -4) -> (0, 0), notch at the origin
        let dart = BoundingBox::new([-4.0, 0.0, 0.0, 4.0], [-4.0, 4.0, 0.0, -4.0]);
        let mask = rasterize(&BoundingBoxSet::new(vec![dart]), 20, 20, 1.0);
        // bb (-1, 1) is inside the dart
        assert_eq!(mask[[9, 9]], 1);
        // bb (0, -2) is inside the hull but below the notch
        assert_eq!(mask[[12, 10]], 0);
    }

    #[test]
    fn test_rasterize_extract_exact_for_pixel_aligned_boxes() {
        let space = BbSpace::default();
        let pixel_boxes = BoundingBoxSet::new(vec![
            BoundingBox::from_rect(100.0, 420.0, 50.0, 25.0),
            BoundingBox::from_rect(300.0, 200.0, 35.0, 15.0),
        ]);
        let mask = rasterize(&pixel_boxes.to_bb_space(&space), 800, 800, space.scale);
        assert_eq!(mask.mapv(u32::from).sum(), 50 * 25 + 35 * 15);

        let extracted = extract_boxes(&mask.mapv(f32::from), 0.5);
        assert_eq!(extracted.len(), 2);
        for bbox in &pixel_boxes {
            assert!(extracted.iter().any(|b| b == bbox), "{bbox:?} not recovered");
        }
    }

    #[test]
    fn test_rasterize_adjacent_boxes_share_no_pixels() {
        let boxes = BoundingBoxSet::new(vec![
            BoundingBox::from_rect(-2.0, -1.0, 2.0, 2.0),
            BoundingBox::from_rect(0.0, -1.0, 2.0, 2.0),
        ]);
        let mask = rasterize(&boxes, 10, 10, 1.0);
        // Two 2x2 boxes side by side fill a 4x2 block without gaps
        assert_eq!(mask.sum(), 8);
        assert_eq!(mask.slice(s![4..6, 3..7]).sum(), 8);
    }

    #[test]
    fn test_rasterize_union() {
        let boxes = BoundingBoxSet::new(vec![
            BoundingBox::from_rect(-1.0, -1.0, 2.0, 2.0),
            BoundingBox::from_rect(-1.0, -1.0, 2.0, 2.0),
        ]);
        let mask = rasterize(&boxes, 12, 12, 2.0);
        assert_eq!(mask.iter().copied().max(), Some(1));
        assert_eq!(mask.sum(), 16);
    }

    #[test]
    fn test_rasterize_empty() {
        let mask = rasterize(&BoundingBoxSet::empty(), 8, 10, 1.0);
        assert_eq!(mask.dim(), (8, 10));
        assert_eq!(mask.sum(), 0);
    }

    #[test]
    fn test_extract_in_bb_space_drops_small() {
        // 30x20 px blob -> 3x2 bb units; 8x8 px blob -> 0.8 units
        let mask = mask_with_rects(800, 800, &[(400, 380, 30, 20), (100, 100, 8, 8)]);
        let boxes = extract_boxes_in_bb_space(&mask, 0.5, &BbSpace::default());
        assert_eq!(boxes.len(), 1);
        let extent = boxes.as_slice()[0].extent();
        assert!((extent.min_x - 0.0).abs() < 1e-9);
        assert!((extent.max_x - 3.0).abs() < 1e-9);
        assert!((extent.min_y - 0.0).abs() < 1e-9);
        assert!((extent.max_y - 2.0).abs() < 1e-9);
    }
}
