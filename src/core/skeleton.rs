//! Skeletal model slots written by the input layer.
//!
//! The solver that consumes these slots lives elsewhere; this crate only
//! owns the hand source selection it reads.

use crate::tracker::{Side, TrackerId};
use serde::{Deserialize, Serialize};

/// Tracker sources chosen to drive the skeleton's hands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonModel {
    pub computed_left_hand: Option<TrackerId>,
    pub computed_right_hand: Option<TrackerId>,
}

impl SkeletonModel {
    /// Create a skeleton with both hand slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker currently driving the hand on `side`.
    pub fn hand_source(&self, side: Side) -> Option<TrackerId> {
        match side {
            Side::Left => self.computed_left_hand,
            Side::Right => self.computed_right_hand,
        }
    }

    /// Set the tracker driving the hand on `side`.
    pub fn set_hand_source(&mut self, side: Side, source: Option<TrackerId>) {
        match side {
            Side::Left => self.computed_left_hand = source,
            Side::Right => self.computed_right_hand = source,
        }
    }
}
