//! Synthetic vehicle boxes for baselines and experiments.

use crate::transform::BbSpace;
use crate::types::{BoundingBox, BoundingBoxSet};
use rand::Rng;

/// Canvas side length, in pixels, that random anchors are drawn from.
pub const CANVAS_SIZE: u32 = 800;

/// Fixed row of car-sized boxes along the main road.
///
/// Boxes are 50×25 px, start at x = 20 and step by 50 while x < 780, in
/// the single lane starting at y = 420. With `in_bb_space` the boxes are
/// converted with the default [`BbSpace`].
pub fn baseline_boxes(in_bb_space: bool) -> BoundingBoxSet {
    const LEN_X: f64 = 50.0;
    const LEN_Y: f64 = 25.0;
    const OFFSET_X: f64 = 20.0;
    const FROM_Y: f64 = 420.0;
    const TO_Y: f64 = 440.0;

    let x_starts = (0u32..)
        .map(|i| OFFSET_X + LEN_X * f64::from(i))
        .take_while(|&x| x < f64::from(CANVAS_SIZE) - OFFSET_X);

    let mut boxes = BoundingBoxSet::empty();
    for x in x_starts {
        let y_starts = (0u32..).map(|j| FROM_Y + LEN_Y * f64::from(j)).take_while(|&y| y < TO_Y);
        for y in y_starts {
            boxes.push(BoundingBox::new(
                [x + LEN_X, x + LEN_X, x, x],
                [y + LEN_Y, y, y + LEN_Y, y],
            ));
        }
    }

    if in_bb_space {
        boxes.to_bb_space(&BbSpace::default())
    } else {
        boxes
    }
}

/// One box of a fixed `(width, height)` hanging up-left of a random anchor.
///
/// The anchor is drawn uniformly from `[0, 800)²` and is the box's
/// bottom-right corner in pixel space.
pub fn random_box<R: Rng>(rng: &mut R, size: (f64, f64)) -> BoundingBox {
    let ax = f64::from(rng.random_range(0..CANVAS_SIZE));
    let ay = f64::from(rng.random_range(0..CANVAS_SIZE));
    let (sx, sy) = size;
    BoundingBox::new([ax, ax, ax - sx, ax - sx], [ay, ay - sy, ay, ay - sy])
}

/// `k` random boxes with widths in `[2, 200]` and heights in `[2, 20]`.
///
/// # Example
///
/// ```
/// use bev_eval::synthetic::random_boxes;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let boxes = random_boxes(&mut rng, 10);
/// assert_eq!(boxes.len(), 10);
/// ```
pub fn random_boxes<R: Rng>(rng: &mut R, k: usize) -> BoundingBoxSet {
    (0..k)
        .map(|_| {
            let sx = f64::from(rng.random_range(2..=200u32));
            let sy = f64::from(rng.random_range(2..=20u32));
            random_box(rng, (sx, sy))
        })
        .collect()
}
