/// Statistics tracking for vehicle box filtering
///
/// Counts how many raw boxes were rejected and why, and how many vehicle
/// boxes were emitted once elongated boxes were split.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters collected by one filter-and-split pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Raw boxes seen
    pub boxes_processed: usize,

    /// Raw boxes rejected for a span below the minimum vehicle size
    pub rejected_too_small: usize,

    /// Raw boxes rejected for leaving the road region
    pub rejected_off_road: usize,

    /// Vehicle boxes emitted after splitting
    pub boxes_emitted: usize,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_box(&mut self) {
        self.boxes_processed += 1;
    }

    pub fn reject_too_small(&mut self) {
        self.rejected_too_small += 1;
    }

    pub fn reject_off_road(&mut self) {
        self.rejected_off_road += 1;
    }

    pub fn emit(&mut self, count: usize) {
        self.boxes_emitted += count;
    }

    /// Raw boxes that passed both checks
    pub fn boxes_kept(&self) -> usize {
        self.boxes_processed
            .saturating_sub(self.rejected_too_small)
            .saturating_sub(self.rejected_off_road)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected_too_small + self.rejected_off_road
    }

    /// Extra boxes created by splitting kept boxes
    pub fn boxes_split_off(&self) -> usize {
        self.boxes_emitted.saturating_sub(self.boxes_kept())
    }

    /// Fold another pass into this one
    pub fn merge(&mut self, other: &FilterStats) {
        self.boxes_processed += other.boxes_processed;
        self.rejected_too_small += other.rejected_too_small;
        self.rejected_off_road += other.rejected_off_road;
        self.boxes_emitted += other.boxes_emitted;
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterStats {{ processed: {}, kept: {}, too_small: {}, off_road: {}, emitted: {} }}",
            self.boxes_processed,
            self.boxes_kept(),
            self.rejected_too_small,
            self.rejected_off_road,
            self.boxes_emitted
        )
    }
}
