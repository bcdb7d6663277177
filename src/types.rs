//! Core data types for boxes, box sets and masks.

use crate::error::{BevEvalError, Result};
use geo::{Area, ConvexHull, Coord, LineString, Polygon};
use ndarray::{Array2, Array3, ArrayBase, Data, Ix3};
use serde::{Deserialize, Serialize};

/// Per-pixel class probabilities or labels, indexed `[row, col]`.
pub type SegmentationMask = Array2<f32>;

/// Binary mask with pixels set to 0 or 1, indexed `[row, col]`.
pub type BinaryMask = Array2<u8>;

/// A 4-corner quadrilateral stored as an x-row and a y-row.
///
/// Corner `i` is `(xs[i], ys[i])`. Boxes fitted from a mask use the ordering
/// `[(x+w, y), (x+w, y+h), (x, y), (x, y+h)]`, which is not a ring order: the
/// polygon outline visits the corners as 0, 1, 3, 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xs: [f64; 4],
    pub ys: [f64; 4],
}

impl BoundingBox {
    /// Create a box from its x-row and y-row.
    pub fn new(xs: [f64; 4], ys: [f64; 4]) -> Self {
        Self { xs, ys }
    }

    /// Create a box from a top-left anchored rectangle.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            xs: [x + width, x + width, x, x],
            ys: [y, y + height, y, y + height],
        }
    }

    /// Axis-aligned extent spanned by the four corners.
    pub fn extent(&self) -> Extent {
        Extent {
            min_x: self.xs.iter().copied().fold(f64::INFINITY, f64::min),
            max_x: self.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_y: self.ys.iter().copied().fold(f64::INFINITY, f64::min),
            max_y: self.ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Width of the axis-aligned extent.
    pub fn width(&self) -> f64 {
        self.extent().width()
    }

    /// Height of the axis-aligned extent.
    pub fn height(&self) -> f64 {
        self.extent().height()
    }

    /// Corners as `(x, y)` pairs in storage order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        std::array::from_fn(|i| (self.xs[i], self.ys[i]))
    }

    /// Closed polygon outline visiting corners 0, 1, 3, 2.
    pub fn polygon(&self) -> Polygon<f64> {
        let ring: Vec<Coord<f64>> = [0, 1, 3, 2]
            .iter()
            .map(|&i| Coord {
                x: self.xs[i],
                y: self.ys[i],
            })
            .collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Convex hull of the four corners, independent of corner ordering.
    pub fn hull(&self) -> Polygon<f64> {
        self.polygon().convex_hull()
    }

    /// Area of the convex hull of the corners.
    pub fn area(&self) -> f64 {
        self.hull().unsigned_area()
    }

    /// Return a copy with every corner mapped through `f`.
    pub fn map_corners<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        let mut out = *self;
        for i in 0..4 {
            let (x, y) = f(self.xs[i], self.ys[i]);
            out.xs[i] = x;
            out.ys[i] = y;
        }
        out
    }
}

/// Axis-aligned extent of a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the open intervals overlap on both axes.
    ///
    /// Extents that only touch along an edge do not overlap; their polygons
    /// share no area.
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.max_x > other.min_x
            && self.min_x < other.max_x
            && self.max_y > other.min_y
            && self.min_y < other.max_y
    }
}

/// Ordered collection of boxes, equivalent to a `(count, 2, 4)` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBoxSet(Vec<BoundingBox>);

impl BoundingBoxSet {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self(boxes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, bbox: BoundingBox) {
        self.0.push(bbox);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundingBox> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BoundingBox] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<BoundingBox> {
        self.0
    }

    /// Extents of every box, in set order.
    pub fn extents(&self) -> Vec<Extent> {
        self.0.iter().map(BoundingBox::extent).collect()
    }

    /// Build a set from a `(count, 2, 4)` array.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError` if the trailing dimensions are not `(2, 4)`.
    pub fn from_array<S>(array: &ArrayBase<S, Ix3>) -> Result<Self>
    where
        S: Data<Elem = f64>,
    {
        let (count, rows, cols) = array.dim();
        if rows != 2 || cols != 4 {
            return Err(BevEvalError::ShapeError(format!(
                "Expected box array of shape (k, 2, 4), got ({count}, {rows}, {cols})"
            )));
        }

        let boxes = array
            .outer_iter()
            .map(|b| {
                BoundingBox::new(
                    std::array::from_fn(|i| b[[0, i]]),
                    std::array::from_fn(|i| b[[1, i]]),
                )
            })
            .collect();
        Ok(Self(boxes))
    }

    /// Convert to a `(count, 2, 4)` array.
    pub fn to_array(&self) -> Array3<f64> {
        let mut array = Array3::zeros((self.0.len(), 2, 4));
        for (k, bbox) in self.0.iter().enumerate() {
            for i in 0..4 {
                array[[k, 0, i]] = bbox.xs[i];
                array[[k, 1, i]] = bbox.ys[i];
            }
        }
        array
    }
}

impl From<Vec<BoundingBox>> for BoundingBoxSet {
    fn from(boxes: Vec<BoundingBox>) -> Self {
        Self(boxes)
    }
}

impl FromIterator<BoundingBox> for BoundingBoxSet {
    fn from_iter<I: IntoIterator<Item = BoundingBox>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<BoundingBox> for BoundingBoxSet {
    fn extend<I: IntoIterator<Item = BoundingBox>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for BoundingBoxSet {
    type Item = BoundingBox;
    type IntoIter = std::vec::IntoIter<BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BoundingBoxSet {
    type Item = &'a BoundingBox;
    type IntoIter = std::slice::Iter<'a, BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
