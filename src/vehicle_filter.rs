//! Post-processing of raw detections into vehicle boxes.
//!
//! Vehicles are assumed to be parked or queued parallel to the main road,
//! which runs along the x axis of the pixel canvas. A raw blob is dropped when
//! it is too small to be a car or leaves the road band, and an elongated blob
//! is cut into consecutive vehicle-length boxes.

use crate::error::{BevEvalError, Result};
use crate::segmentation::extract_boxes;
use crate::stats::FilterStats;
use crate::types::{BoundingBox, BoundingBoxSet};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Size and road-region limits for vehicle boxes, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleFilter {
    /// Length of one vehicle along x
    pub len_x: f64,
    pub min_x_len: f64,
    pub min_y_len: f64,
    /// Road band: boxes must lie within `[min_y_coord, max_y_coord]`
    pub min_y_coord: f64,
    pub max_y_coord: f64,
}

impl Default for VehicleFilter {
    fn default() -> Self {
        Self {
            len_x: 50.0,
            // 60% of a 45x20 px car
            min_x_len: 27.0,
            min_y_len: 12.0,
            min_y_coord: 100.0,
            max_y_coord: 600.0,
        }
    }
}

/// Input accepted by [`VehicleFilter::process`].
#[derive(Debug, Clone, Copy)]
pub enum FilterInput<'a> {
    /// Probability mask, binarised at `threshold` before box extraction
    Mask { mask: ArrayView2<'a, f32>, threshold: f32 },
    /// Raw pixel-space boxes
    Boxes(&'a BoundingBoxSet),
}

/// Upper bound on the vehicles cut from a single raw box
const MAX_PIECES_PER_BOX: usize = 1 << 20;

enum Verdict {
    TooSmall,
    OffRoad,
    Split(Vec<BoundingBox>),
}

impl VehicleFilter {
    pub fn new(len_x: f64, min_x_len: f64, min_y_len: f64, min_y_coord: f64, max_y_coord: f64) -> Self {
        Self {
            len_x,
            min_x_len,
            min_y_len,
            min_y_coord,
            max_y_coord,
        }
    }

    /// Check that the vehicle length is positive and the road band is ordered.
    pub fn validate(&self) -> Result<()> {
        if !(self.len_x > 0.0 && self.len_x.is_finite()) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Vehicle length must be positive, got {}",
                self.len_x
            )));
        }
        if !(self.min_x_len >= 0.0 && self.min_y_len >= 0.0) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Minimum spans must be non-negative, got ({}, {})",
                self.min_x_len, self.min_y_len
            )));
        }
        if !(self.min_y_coord <= self.max_y_coord) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Road band is empty: min_y_coord {} > max_y_coord {}",
                self.min_y_coord, self.max_y_coord
            )));
        }
        Ok(())
    }

    /// Filter raw boxes and split elongated ones into vehicle-length boxes.
    ///
    /// See [`VehicleFilter::filter_and_split_with_stats`].
    pub fn filter_and_split(&self, raw_boxes: &BoundingBoxSet) -> Result<BoundingBoxSet> {
        Ok(self.filter_and_split_with_stats(raw_boxes)?.0)
    }

    /// Filter raw boxes and split elongated ones, returning pass statistics.
    ///
    /// A box is rejected when its x-span is below `min_x_len` or its y-span is
    /// below `min_y_len`, or when its y-range leaves the road band. A kept box
    /// with x-span `L` is cut into `max(2, round(L / len_x) + 1) - 1` equal
    /// pieces along x, so at least one box is always emitted. Rounding is to
    /// nearest with ties to even. Each piece keeps the original y-row.
    ///
    /// # Errors
    ///
    /// Returns [`BevEvalError::InvalidConfig`] when the limits fail
    /// [`VehicleFilter::validate`], or when a box would be cut into more
    /// pieces than can be represented.
    pub fn filter_and_split_with_stats(
        &self,
        raw_boxes: &BoundingBoxSet,
    ) -> Result<(BoundingBoxSet, FilterStats)> {
        self.validate()?;

        let mut stats = FilterStats::new();
        let mut out = BoundingBoxSet::empty();

        for bbox in raw_boxes {
            stats.add_box();
            match self.judge(bbox)? {
                Verdict::TooSmall => stats.reject_too_small(),
                Verdict::OffRoad => stats.reject_off_road(),
                Verdict::Split(pieces) => {
                    stats.emit(pieces.len());
                    out.extend(pieces);
                }
            }
        }

        debug!(
            processed = stats.boxes_processed,
            too_small = stats.rejected_too_small,
            off_road = stats.rejected_off_road,
            emitted = stats.boxes_emitted,
            "filtered vehicle boxes"
        );
        Ok((out, stats))
    }

    /// Extract boxes from a mask, then filter and split them.
    pub fn process_mask(&self, mask: ArrayView2<'_, f32>, threshold: f32) -> Result<BoundingBoxSet> {
        self.filter_and_split(&extract_boxes(&mask, threshold))
    }

    /// Run the full post-processing on either a mask or raw boxes.
    pub fn process(&self, input: FilterInput<'_>) -> Result<BoundingBoxSet> {
        match input {
            FilterInput::Mask { mask, threshold } => self.process_mask(mask, threshold),
            FilterInput::Boxes(boxes) => self.filter_and_split(boxes),
        }
    }

    fn judge(&self, bbox: &BoundingBox) -> Result<Verdict> {
        let extent = bbox.extent();

        if extent.width() < self.min_x_len || extent.height() < self.min_y_len {
            return Ok(Verdict::TooSmall);
        }
        if extent.max_y > self.max_y_coord || extent.min_y < self.min_y_coord {
            return Ok(Verdict::OffRoad);
        }

        let num_units = (extent.width() / self.len_x).round_ties_even();
        if !(num_units < MAX_PIECES_PER_BOX as f64) {
            return Err(BevEvalError::InvalidConfig(format!(
                "Cannot split a box of width {} into vehicles of length {}",
                extent.width(),
                self.len_x
            )));
        }
        let num_breaks = (num_units as usize + 1).max(2);
        let breaks = linspace(extent.min_x, extent.max_x, num_breaks);

        let pieces = breaks
            .windows(2)
            .map(|w| {
                let (new_min, new_max) = (w[0], w[1]);
                BoundingBox::new([new_max, new_max, new_min, new_min], bbox.ys)
            })
            .collect();
        Ok(Verdict::Split(pieces))
    }
}

/// Filter and split raw boxes with explicit limits.
///
/// Equivalent to building a [`VehicleFilter`] and calling
/// [`VehicleFilter::filter_and_split`].
///
/// # Example
///
/// ```
/// use bev_eval::vehicle_filter::filter_and_split;
/// use bev_eval::types::{BoundingBox, BoundingBoxSet};
///
/// let raw = BoundingBoxSet::new(vec![BoundingBox::from_rect(100.0, 300.0, 150.0, 20.0)]);
/// let cars = filter_and_split(&raw, 50.0, 27.0, 12.0, 100.0, 600.0).unwrap();
/// assert_eq!(cars.len(), 3);
/// assert!(filter_and_split(&raw, 0.0, 27.0, 12.0, 100.0, 600.0).is_err());
/// ```
pub fn filter_and_split(
    raw_boxes: &BoundingBoxSet,
    len_x: f64,
    min_x_len: f64,
    min_y_len: f64,
    min_y_coord: f64,
    max_y_coord: f64,
) -> Result<BoundingBoxSet> {
    VehicleFilter::new(len_x, min_x_len, min_y_len, min_y_coord, max_y_coord).filter_and_split(raw_boxes)
}

/// `num` evenly spaced values from `start` to `end` inclusive, `num >= 2`.
fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    let step = (end - start) / (num - 1) as f64;
    (0..num)
        .map(|i| if i == num - 1 { end } else { start + step * i as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{s, Array2};

    fn raw(x: f64, y: f64, w: f64, h: f64) -> BoundingBoxSet {
        BoundingBoxSet::new(vec![BoundingBox::from_rect(x, y, w, h)])
    }

    #[test]
    fn test_split_into_three() {
        let (cars, stats) = VehicleFilter::default()
            .filter_and_split_with_stats(&raw(100.0, 300.0, 150.0, 20.0))
            .unwrap();
        assert_eq!(cars.len(), 3);
        for (i, car) in cars.iter().enumerate() {
            let extent = car.extent();
            assert_abs_diff_eq!(extent.min_x, 100.0 + 50.0 * i as f64, epsilon = 1e-9);
            assert_abs_diff_eq!(extent.width(), 50.0, epsilon = 1e-9);
            assert_eq!(car.ys, [300.0, 320.0, 300.0, 320.0]);
        }
        assert_eq!(stats.boxes_emitted, 3);
        assert_eq!(stats.boxes_split_off(), 2);
    }

    #[test]
    fn test_short_box_yields_one() {
        // 30 / 50 rounds to 1 -> 2 breaks -> 1 box
        let cars = VehicleFilter::default().filter_and_split(&raw(100.0, 300.0, 30.0, 20.0)).unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars.as_slice()[0].xs, [130.0, 130.0, 100.0, 100.0]);
    }

    #[test]
    fn test_split_count_minimum() {
        // 27 / 100 rounds to 0 -> clamped to 2 breaks -> still 1 box
        let filter = VehicleFilter {
            len_x: 100.0,
            ..VehicleFilter::default()
        };
        assert_eq!(filter.filter_and_split(&raw(100.0, 300.0, 27.0, 20.0)).unwrap().len(), 1);
    }

    #[test]
    fn test_ties_round_to_even() {
        // 125 / 50 = 2.5 -> 2 -> 3 breaks -> 2 boxes
        let cars = VehicleFilter::default().filter_and_split(&raw(100.0, 300.0, 125.0, 20.0)).unwrap();
        assert_eq!(cars.len(), 2);
        // 175 / 50 = 3.5 -> 4 -> 5 breaks -> 4 boxes
        let cars = VehicleFilter::default().filter_and_split(&raw(100.0, 300.0, 175.0, 20.0)).unwrap();
        assert_eq!(cars.len(), 4);
    }

    #[test]
    fn test_too_small_rejected() {
        let filter = VehicleFilter::default();
        let (cars, stats) = filter.filter_and_split_with_stats(&raw(100.0, 300.0, 20.0, 20.0)).unwrap();
        assert!(cars.is_empty());
        assert_eq!(stats.rejected_too_small, 1);

        let (cars, _) = filter.filter_and_split_with_stats(&raw(100.0, 300.0, 50.0, 10.0)).unwrap();
        assert!(cars.is_empty());
    }

    #[test]
    fn test_off_road_rejected() {
        let filter = VehicleFilter::default();
        for bbox in [raw(100.0, 50.0, 50.0, 20.0), raw(100.0, 590.0, 50.0, 20.0), raw(100.0, 95.0, 50.0, 20.0)] {
            let (cars, stats) = filter.filter_and_split_with_stats(&bbox).unwrap();
            assert!(cars.is_empty());
            assert_eq!(stats.rejected_off_road, 1);
        }
    }

    #[test]
    fn test_empty_input() {
        let (cars, stats) = VehicleFilter::default()
            .filter_and_split_with_stats(&BoundingBoxSet::empty())
            .unwrap();
        assert!(cars.is_empty());
        assert_eq!(stats, FilterStats::new());
    }

    #[test]
    fn test_process_mask() {
        let mut mask = Array2::<f32>::zeros((800, 800));
        mask.slice_mut(s![400..420, 200..300]).fill(0.9);
        // Tiny speck, rejected as too small
        mask.slice_mut(s![450..453, 600..603]).fill(0.9);

        let filter = VehicleFilter::default();
        let cars = filter
            .process(FilterInput::Mask {
                mask: mask.view(),
                threshold: 0.5,
            })
            .unwrap();
        assert_eq!(cars.len(), 2);

        let boxes = extract_boxes(&mask, 0.5);
        assert_eq!(filter.process(FilterInput::Boxes(&boxes)).unwrap(), cars);
    }

    #[test]
    fn test_invalid_vehicle_length_is_an_error() {
        let boxes = raw(100.0, 300.0, 150.0, 20.0);
        for len_x in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let filter = VehicleFilter {
                len_x,
                ..VehicleFilter::default()
            };
            assert!(
                matches!(filter.filter_and_split(&boxes), Err(BevEvalError::InvalidConfig(_))),
                "len_x = {len_x} should be rejected"
            );
            assert!(filter.process(FilterInput::Boxes(&boxes)).is_err());
        }
        assert!(matches!(
            filter_and_split(&boxes, 0.0, 27.0, 12.0, 100.0, 600.0),
            Err(BevEvalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_too_many_pieces_is_an_error() {
        let filter = VehicleFilter {
            len_x: 1e-12,
            ..VehicleFilter::default()
        };
        assert!(matches!(
            filter.filter_and_split(&raw(100.0, 300.0, 150.0, 20.0)),
            Err(BevEvalError::InvalidConfig(_))
        ));
        // Rejected boxes never reach the split
        let (cars, stats) = filter.filter_and_split_with_stats(&raw(100.0, 50.0, 150.0, 20.0)).unwrap();
        assert!(cars.is_empty());
        assert_eq!(stats.rejected_off_road, 1);
    }

    #[test]
    fn test_validate() {
        assert!(VehicleFilter::default().validate().is_ok());
        let bad = VehicleFilter {
            len_x: 0.0,
            ..VehicleFilter::default()
        };
        assert!(bad.validate().is_err());
        let bad = VehicleFilter {
            min_y_coord: 700.0,
            ..VehicleFilter::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 2), vec![0.0, 1.0]);
        assert_eq!(linspace(0.0, 150.0, 4), vec![0.0, 50.0, 100.0, 150.0]);
    }
}
