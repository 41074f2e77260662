//! The tracker entity shared by producers (calibration, transport) and
//! consumers (skeleton, recorder).

use crate::tracker::role::TrackerRole;
use chrono::{DateTime, Utc};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Stable identity of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackerId(pub u32);

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_LOCAL_TRACKER_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a fresh id for a tracker created inside this process.
pub fn next_local_tracker_id() -> TrackerId {
    TrackerId(NEXT_LOCAL_TRACKER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Connection/usability status of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    #[default]
    Disconnected,
    Ok,
    Busy,
    Error,
    Occluded,
    TimedOut,
}

impl TrackerStatus {
    /// Whether data from a tracker in this status can be used.
    pub fn is_usable(self) -> bool {
        matches!(self, TrackerStatus::Ok)
    }
}

/// A logical source of pose data attached to an anatomical role.
#[derive(Debug, Clone)]
pub struct Tracker {
    id: TrackerId,
    pub name: String,
    pub role: Option<TrackerRole>,
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub acceleration: Vector3<f32>,
    pub has_position: bool,
    pub has_rotation: bool,
    pub has_acceleration: bool,
    /// Created by the server rather than backed by a device
    pub is_internal: bool,
    /// Derived from other data rather than measured
    pub is_computed: bool,
    pub status: TrackerStatus,
    data_ticks: u64,
    last_data_at: Option<DateTime<Utc>>,
}

impl Tracker {
    /// Create a tracker with a freshly allocated id and no capabilities.
    pub fn new(name: impl Into<String>, role: Option<TrackerRole>) -> Self {
        Self::with_id(next_local_tracker_id(), name, role)
    }

    /// Create a tracker with an explicit id.
    pub fn with_id(id: TrackerId, name: impl Into<String>, role: Option<TrackerRole>) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            acceleration: Vector3::zeros(),
            has_position: false,
            has_rotation: false,
            has_acceleration: false,
            is_internal: false,
            is_computed: false,
            status: TrackerStatus::Disconnected,
            data_ticks: 0,
            last_data_at: None,
        }
    }

    /// Declare that this tracker reports position.
    pub fn with_position_capability(mut self) -> Self {
        self.has_position = true;
        self
    }

    /// Declare that this tracker reports rotation.
    pub fn with_rotation_capability(mut self) -> Self {
        self.has_rotation = true;
        self
    }

    /// Declare that this tracker reports acceleration.
    pub fn with_acceleration_capability(mut self) -> Self {
        self.has_acceleration = true;
        self
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: TrackerStatus) -> Self {
        self.status = status;
        self
    }

    /// Stable tracker id.
    pub fn id(&self) -> TrackerId {
        self.id
    }

    /// Update the position.
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    /// Update the rotation.
    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.rotation = rotation;
    }

    /// Mark that new data has been applied to this tracker.
    pub fn data_tick(&mut self) {
        self.data_ticks += 1;
        self.last_data_at = Some(Utc::now());
    }

    /// Number of data updates signalled so far.
    pub fn data_ticks(&self) -> u64 {
        self.data_ticks
    }

    /// Time of the last data tick.
    pub fn last_data_at(&self) -> Option<DateTime<Utc>> {
        self.last_data_at
    }

    /// True when the tracker reports position and is not parked at the origin.
    ///
    /// Runtimes report an untracked controller at `(0, 0, 0)`.
    pub fn has_live_position(&self) -> bool {
        self.has_position && self.position != Vector3::zeros()
    }
}
