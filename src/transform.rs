//! Conversion between pixel space and bounding-box space.
//!
//! Pixel space has its origin in the top-left corner of the canvas with y
//! growing downward. Bounding-box space is centred on the canvas, has y growing
//! upward, and is divided by a uniform scale factor. With the default 800×800
//! canvas and a scale of 10, pixel `(400, 400)` is the bb-space origin and
//! pixel `(0, 0)` maps to `(-40, 40)`.

use crate::error::{BevEvalError, Result};
use crate::types::{BoundingBox, BoundingBoxSet};
use ndarray::{Array, ArrayBase, Axis, Data, Dimension};
use serde::{Deserialize, Serialize};

/// Canvas geometry defining the affine map between the two spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BbSpace {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub scale: f64,
}

impl Default for BbSpace {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 800.0,
            scale: 10.0,
        }
    }
}

impl BbSpace {
    pub fn new(canvas_width: f64, canvas_height: f64, scale: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            scale,
        }
    }

    /// Check that the canvas and scale are strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Canvas must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.scale > 0.0) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Map a single pixel-space point into bb-space.
    #[inline]
    pub fn point_to_bb(&self, x: f64, y: f64) -> (f64, f64) {
        let flipped_y = self.canvas_height - y;
        (
            (x - self.canvas_width / 2.0) / self.scale,
            (flipped_y - self.canvas_height / 2.0) / self.scale,
        )
    }

    /// Map a single bb-space point back into pixel space.
    #[inline]
    pub fn point_from_bb(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x * self.scale + self.canvas_width / 2.0;
        let py = y * self.scale + self.canvas_height / 2.0;
        (px, self.canvas_height - py)
    }

    /// Convert an array of points into bb-space.
    ///
    /// `axis` designates the size-2 `(x, y)` axis; negative values count from
    /// the last axis. The input is left untouched and a new array is returned.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError` if `axis` is out of range or does not have size 2.
    pub fn to_bb_space<S, D>(&self, points: &ArrayBase<S, D>, axis: isize) -> Result<Array<f64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        map_points(points, axis, |x, y| self.point_to_bb(x, y))
    }

    /// Convert an array of points from bb-space back to pixel space.
    ///
    /// Exact inverse of [`BbSpace::to_bb_space`].
    pub fn from_bb_space<S, D>(&self, points: &ArrayBase<S, D>, axis: isize) -> Result<Array<f64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        map_points(points, axis, |x, y| self.point_from_bb(x, y))
    }

    pub fn box_to_bb(&self, bbox: &BoundingBox) -> BoundingBox {
        bbox.map_corners(|x, y| self.point_to_bb(x, y))
    }

    pub fn box_from_bb(&self, bbox: &BoundingBox) -> BoundingBox {
        bbox.map_corners(|x, y| self.point_from_bb(x, y))
    }
}

/// Convert points into bb-space using the default 800×800 canvas and scale 10.
pub fn to_bb_space<S, D>(points: &ArrayBase<S, D>, axis: isize) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    BbSpace::default().to_bb_space(points, axis)
}

/// Convert points from bb-space using the default 800×800 canvas and scale 10.
pub fn from_bb_space<S, D>(points: &ArrayBase<S, D>, axis: isize) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    BbSpace::default().from_bb_space(points, axis)
}

impl BoundingBoxSet {
    /// Convert every box from pixel space into bb-space.
    pub fn to_bb_space(&self, space: &BbSpace) -> BoundingBoxSet {
        self.iter().map(|b| space.box_to_bb(b)).collect()
    }

    /// Convert every box from bb-space back into pixel space.
    pub fn from_bb_space(&self, space: &BbSpace) -> BoundingBoxSet {
        self.iter().map(|b| space.box_from_bb(b)).collect()
    }
}

fn resolve_axis(ndim: usize, axis: isize) -> Result<Axis> {
    let resolved = if axis < 0 { ndim as isize + axis } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(BevEvalError::ShapeError(format!(
            "Axis {axis} is out of range for an array of rank {ndim}"
        )));
    }
    Ok(Axis(resolved as usize))
}

fn map_points<S, D, F>(points: &ArrayBase<S, D>, axis: isize, f: F) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
    F: Fn(f64, f64) -> (f64, f64),
{
    let axis = resolve_axis(points.ndim(), axis)?;
    let size = points.len_of(axis);
    if size != 2 {
        return Err(BevEvalError::ShapeError(format!(
            "Axis {} should have size 2 (x, y), got {size}",
            axis.index()
        )));
    }

    let mut out = points.to_owned();
    for mut lane in out.lanes_mut(axis) {
        let (x, y) = f(lane[0], lane[1]);
        lane[0] = x;
        lane[1] = y;
    }
    Ok(out)
}
