//! Hand source arbitration.
//!
//! Every tick the arbiter scans the live trackers and picks which one drives
//! each hand of the skeleton. A controller with a live position becomes the
//! candidate for its side. A hand-tracking source replaces the candidate only
//! when a candidate already exists for that side earlier in the same scan, so
//! the result depends on registry order.

use crate::core::skeleton::SkeletonModel;
use crate::tracker::{Side, Tracker, TrackerId, TrackerRole};
use tracing::{debug, info};

/// One-way activation latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Disabled,
    Enabled,
}

/// Hand sources picked by one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandSelection {
    pub left: Option<TrackerId>,
    pub right: Option<TrackerId>,
}

impl HandSelection {
    /// Selected tracker for `side`.
    pub fn get(&self, side: Side) -> Option<TrackerId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn slot(&mut self, side: Side) -> &mut Option<TrackerId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Picks the tracker that drives each hand.
#[derive(Debug, Default)]
pub struct HandSourceArbiter {
    activation: Activation,
}

impl HandSourceArbiter {
    /// Create a disabled arbiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the arbiter. Once enabled it stays enabled; `false` is ignored.
    pub fn set_enabled(&mut self, value: bool) {
        if value && self.activation == Activation::Disabled {
            self.activation = Activation::Enabled;
            info!("Hand source substitution enabled");
        }
    }

    /// Current activation state.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Whether the arbiter writes hand sources.
    pub fn is_enabled(&self) -> bool {
        self.activation == Activation::Enabled
    }

    /// Select hand sources and write them into the skeleton.
    ///
    /// Does nothing while disabled. Both slots are overwritten, with `None`
    /// when nothing qualified this tick.
    pub fn update<'a, I>(&self, trackers: I, skeleton: &mut SkeletonModel)
    where
        I: IntoIterator<Item = &'a Tracker>,
    {
        if !self.is_enabled() {
            return;
        }

        let selection = Self::select(trackers);
        for side in [Side::Left, Side::Right] {
            let previous = skeleton.hand_source(side);
            let current = selection.get(side);
            if previous != current {
                debug!(?side, ?previous, ?current, "Hand source changed");
            }
            skeleton.set_hand_source(side, current);
        }
    }

    /// Run the selection scan without touching any skeleton.
    pub fn select<'a, I>(trackers: I) -> HandSelection
    where
        I: IntoIterator<Item = &'a Tracker>,
    {
        let mut selection = HandSelection::default();

        for tracker in trackers {
            let Some(role) = tracker.role else {
                continue;
            };
            if !tracker.has_live_position() {
                continue;
            }

            for side in [Side::Left, Side::Right] {
                let candidate = selection.slot(side);
                if role == TrackerRole::controller(side)
                    || (role == TrackerRole::hand(side) && candidate.is_some())
                {
                    *candidate = Some(tracker.id());
                }
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn positioned(role: TrackerRole, x: f32, y: f32, z: f32) -> Tracker {
        let mut tracker = Tracker::new(role.as_str(), Some(role)).with_position_capability();
        tracker.set_position(Vector3::new(x, y, z));
        tracker
    }

    fn enabled() -> HandSourceArbiter {
        let mut arbiter = HandSourceArbiter::new();
        arbiter.set_enabled(true);
        arbiter
    }

    #[test]
    fn test_enable_is_sticky() {
        let mut arbiter = HandSourceArbiter::new();
        assert_eq!(arbiter.activation(), Activation::Disabled);

        arbiter.set_enabled(false);
        assert!(!arbiter.is_enabled());

        arbiter.set_enabled(true);
        arbiter.set_enabled(false);
        assert!(arbiter.is_enabled());
    }

    #[test]
    fn test_disabled_update_is_noop() {
        let arbiter = HandSourceArbiter::new();
        let trackers = vec![positioned(TrackerRole::LeftController, 1.0, 2.0, 3.0)];
        let mut skeleton = SkeletonModel::new();
        skeleton.computed_right_hand = Some(TrackerId(99));

        arbiter.update(&trackers, &mut skeleton);
        assert_eq!(skeleton.computed_left_hand, None);
        assert_eq!(skeleton.computed_right_hand, Some(TrackerId(99)));
    }

    #[test]
    fn test_controller_at_origin_rejected() {
        let trackers = vec![
            positioned(TrackerRole::LeftController, 0.0, 0.0, 0.0),
            positioned(TrackerRole::LeftHand, 1.0, 0.0, 0.0),
        ];
        let mut skeleton = SkeletonModel::new();
        enabled().update(&trackers, &mut skeleton);

        assert_eq!(skeleton.computed_left_hand, None);
    }

    #[test]
    fn test_hand_overrides_earlier_controller() {
        let controller = positioned(TrackerRole::LeftController, 1.0, 2.0, 3.0);
        let hand = positioned(TrackerRole::LeftHand, 4.0, 5.0, 6.0);
        let hand_id = hand.id();
        let trackers = vec![controller, hand];

        let mut skeleton = SkeletonModel::new();
        enabled().update(&trackers, &mut skeleton);

        assert_eq!(skeleton.computed_left_hand, Some(hand_id));
        assert_eq!(skeleton.computed_right_hand, None);
    }

    // Registry order matters: a hand seen before its controller is ignored.
    #[test]
    fn test_hand_before_controller_is_ignored() {
        let hand = positioned(TrackerRole::RightHand, 4.0, 5.0, 6.0);
        let controller = positioned(TrackerRole::RightController, 1.0, 2.0, 3.0);
        let controller_id = controller.id();
        let trackers = vec![hand, controller];

        let selection = HandSourceArbiter::select(&trackers);
        assert_eq!(selection.right, Some(controller_id));
    }

    #[test]
    fn test_later_controller_replaces_hand() {
        let first = positioned(TrackerRole::LeftController, 1.0, 0.0, 0.0);
        let hand = positioned(TrackerRole::LeftHand, 2.0, 0.0, 0.0);
        let second = positioned(TrackerRole::LeftController, 3.0, 0.0, 0.0);
        let second_id = second.id();

        let selection = HandSourceArbiter::select(&[first, hand, second]);
        assert_eq!(selection.left, Some(second_id));
    }

    #[test]
    fn test_sides_are_independent() {
        let left = positioned(TrackerRole::LeftController, 1.0, 0.0, 0.0);
        let right_hand = positioned(TrackerRole::RightHand, 1.0, 0.0, 0.0);
        let left_id = left.id();

        let selection = HandSourceArbiter::select(&[left, right_hand]);
        assert_eq!(selection.left, Some(left_id));
        assert_eq!(selection.right, None);
    }

    #[test]
    fn test_requires_position_capability() {
        let mut controller = Tracker::new("ctrl", Some(TrackerRole::RightController));
        controller.set_position(Vector3::new(1.0, 1.0, 1.0));

        let selection = HandSourceArbiter::select(&[controller]);
        assert_eq!(selection, HandSelection::default());
    }

    #[test]
    fn test_update_clears_stale_selection() {
        let arbiter = enabled();
        let mut trackers = vec![positioned(TrackerRole::LeftController, 1.0, 0.0, 0.0)];
        let mut skeleton = SkeletonModel::new();

        arbiter.update(&trackers, &mut skeleton);
        assert!(skeleton.computed_left_hand.is_some());

        trackers[0].set_position(Vector3::zeros());
        arbiter.update(&trackers, &mut skeleton);
        assert_eq!(skeleton.computed_left_hand, None);
    }
}
