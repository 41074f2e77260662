//! Per-tracker frame history.
//!
//! A [`FrameHistory`] is the ordered sample log of one named tracker stream.
//! Slots may be empty to represent dropped samples. Index order is time
//! order.

use crate::tracker::{Tracker, TrackerRole, TrackerStatus};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Initial capacity of a new history.
pub const DEFAULT_FRAME_CAPACITY: usize = 5;

/// Snapshot of a tracker's observable state at one point in time.
///
/// A field is present exactly when the tracker declared that capability
/// when the snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<TrackerRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector3<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<UnitQuaternion<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Vector3<f32>>,
}

impl TrackerFrame {
    /// A frame carrying nothing.
    pub const EMPTY: TrackerFrame = TrackerFrame {
        role: None,
        position: None,
        rotation: None,
        acceleration: None,
    };

    /// Snapshot the capabilities the tracker declares.
    pub fn from_tracker(tracker: &Tracker) -> Self {
        Self {
            role: tracker.role,
            position: tracker.has_position.then_some(tracker.position),
            rotation: tracker.has_rotation.then_some(tracker.rotation),
            acceleration: tracker.has_acceleration.then_some(tracker.acceleration),
        }
    }

    /// Whether the snapshot carries a position.
    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// Whether the snapshot carries a rotation.
    pub fn has_rotation(&self) -> bool {
        self.rotation.is_some()
    }

    /// Whether the snapshot carries an acceleration.
    pub fn has_acceleration(&self) -> bool {
        self.acceleration.is_some()
    }
}

impl Default for TrackerFrame {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Ordered, sparse sample log for one tracker stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameHistory {
    pub name: String,
    frames: Vec<Option<TrackerFrame>>,
}

impl FrameHistory {
    /// Create an empty history with the default capacity.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_FRAME_CAPACITY)
    }

    /// Create an empty history with room for `capacity` frames.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Empty history named after a tracker.
    pub fn for_tracker(tracker: &Tracker) -> Self {
        Self::new(tracker.name.clone())
    }

    /// Build a history from existing frames.
    pub fn from_frames(name: impl Into<String>, frames: Vec<Option<TrackerFrame>>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    /// Snapshot the tracker and append it.
    pub fn append_frame(&mut self, tracker: &Tracker) -> TrackerFrame {
        let frame = TrackerFrame::from_tracker(tracker);
        self.frames.push(Some(frame));
        frame
    }

    /// Snapshot the tracker and store it at `index`, shifting later frames.
    ///
    /// An index past the end pads the gap with dropped samples so the
    /// snapshot lands exactly at `index`.
    pub fn insert_frame(&mut self, index: usize, tracker: &Tracker) -> TrackerFrame {
        let frame = TrackerFrame::from_tracker(tracker);
        if index > self.frames.len() {
            self.frames.resize(index, None);
        }
        self.frames.insert(index, Some(frame));
        frame
    }

    /// Append an absent slot for a sample that never arrived.
    pub fn push_dropped(&mut self) {
        self.frames.push(None);
    }

    /// Frame at `index`; `None` when out of range or dropped.
    pub fn frame_at(&self, index: usize) -> Option<&TrackerFrame> {
        self.frames.get(index).and_then(Option::as_ref)
    }

    /// First frame that is present, in time order.
    pub fn first_valid_frame(&self) -> Option<&TrackerFrame> {
        self.frames.iter().find_map(Option::as_ref)
    }

    /// Build a placeholder tracker shaped like this stream.
    ///
    /// Role and capabilities come from the first valid frame, or from
    /// [`TrackerFrame::EMPTY`] when there is none. The tracker gets a fresh id,
    /// is internal and computed, and is immediately usable.
    pub fn materialize_tracker(&self) -> Tracker {
        let first = self.first_valid_frame().unwrap_or(&TrackerFrame::EMPTY);

        let mut tracker = Tracker::new(self.name.clone(), first.role);
        tracker.has_position = first.has_position();
        tracker.has_rotation = first.has_rotation();
        tracker.has_acceleration = first.has_acceleration();
        tracker.is_internal = true;
        tracker.is_computed = true;
        tracker.status = TrackerStatus::Ok;
        tracker
    }

    /// All slots, dropped ones included.
    pub fn frames(&self) -> &[Option<TrackerFrame>] {
        &self.frames
    }

    /// Iterate over slots in time order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&TrackerFrame>> {
        self.frames.iter().map(Option::as_ref)
    }

    /// Number of slots, dropped ones included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of present frames.
    pub fn valid_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glove_tracker() -> Tracker {
        let mut tracker = Tracker::new("glove-l-index", Some(TrackerRole::LeftIndexProximal))
            .with_rotation_capability();
        tracker.set_rotation(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5));
        tracker
    }

    #[test]
    fn test_snapshot_respects_capabilities() {
        let tracker = glove_tracker();
        let frame = TrackerFrame::from_tracker(&tracker);

        assert_eq!(frame.role, Some(TrackerRole::LeftIndexProximal));
        assert!(frame.has_rotation());
        assert!(!frame.has_position());
        assert!(!frame.has_acceleration());
    }

    #[test]
    fn test_snapshot_is_immutable_copy() {
        let mut tracker = glove_tracker();
        let mut history = FrameHistory::for_tracker(&tracker);
        let captured = history.append_frame(&tracker);

        tracker.set_rotation(UnitQuaternion::identity());
        assert_eq!(history.frame_at(0), Some(&captured));
        assert_ne!(history.frame_at(0).and_then(|f| f.rotation), Some(tracker.rotation));
    }

    #[test]
    fn test_frame_at_out_of_range() {
        let tracker = glove_tracker();
        let mut history = FrameHistory::new("stream");
        history.append_frame(&tracker);

        assert!(history.frame_at(0).is_some());
        assert!(history.frame_at(1).is_none());
        assert!(history.frame_at(usize::MAX).is_none());
    }

    #[test]
    fn test_first_valid_frame_skips_dropped() {
        let tracker = glove_tracker();
        let mut history = FrameHistory::new("stream");
        history.push_dropped();
        history.push_dropped();
        let a = history.append_frame(&tracker);
        history.append_frame(&Tracker::new("other", Some(TrackerRole::Head)));

        assert_eq!(history.first_valid_frame(), Some(&a));
        assert_eq!(history.len(), 4);
        assert_eq!(history.valid_count(), 2);
    }

    #[test]
    fn test_first_valid_frame_all_dropped() {
        let history = FrameHistory::from_frames("stream", vec![None, None, None]);
        assert!(history.first_valid_frame().is_none());
        assert!(FrameHistory::new("empty").first_valid_frame().is_none());
    }

    #[test]
    fn test_insert_shifts_later_frames() {
        let head = Tracker::new("head", Some(TrackerRole::Head));
        let hip = Tracker::new("hip", Some(TrackerRole::Hip));
        let chest = Tracker::new("chest", Some(TrackerRole::Chest));

        let mut history = FrameHistory::new("stream");
        history.append_frame(&head);
        history.append_frame(&hip);
        history.insert_frame(1, &chest);

        let roles: Vec<_> = history.iter().map(|f| f.and_then(|f| f.role)).collect();
        assert_eq!(
            roles,
            vec![
                Some(TrackerRole::Head),
                Some(TrackerRole::Chest),
                Some(TrackerRole::Hip)
            ]
        );
    }

    #[test]
    fn test_insert_past_end_pads_with_dropped() {
        let head = Tracker::new("head", Some(TrackerRole::Head));
        let mut history = FrameHistory::new("stream");
        history.append_frame(&head);
        history.insert_frame(3, &head);

        assert_eq!(history.len(), 4);
        assert!(history.frame_at(1).is_none());
        assert!(history.frame_at(2).is_none());
        assert!(history.frame_at(3).is_some());
    }

    #[test]
    fn test_materialize_from_empty_history() {
        let history = FrameHistory::new("ghost");
        let tracker = history.materialize_tracker();

        assert_eq!(tracker.name, "ghost");
        assert_eq!(tracker.role, None);
        assert!(!tracker.has_position);
        assert!(!tracker.has_rotation);
        assert!(!tracker.has_acceleration);
        assert!(tracker.is_internal);
        assert!(tracker.is_computed);
        assert_eq!(tracker.status, TrackerStatus::Ok);
    }

    #[test]
    fn test_materialize_uses_first_valid_frame() {
        let mut controller = Tracker::new("ctrl", Some(TrackerRole::RightController))
            .with_position_capability()
            .with_rotation_capability()
            .with_acceleration_capability();
        controller.set_position(Vector3::new(0.1, 1.2, 0.3));

        let mut history = FrameHistory::new("ctrl");
        history.push_dropped();
        history.append_frame(&controller);
        history.append_frame(&glove_tracker());

        let first = history.materialize_tracker();
        let second = history.materialize_tracker();
        assert_eq!(first.role, Some(TrackerRole::RightController));
        assert!(first.has_position && first.has_rotation && first.has_acceleration);
        assert_ne!(first.id(), controller.id());
        assert_ne!(first.id(), second.id());
    }
}
