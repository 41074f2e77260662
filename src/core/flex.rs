//! Flex sensor calibration.
//!
//! A flex sensor reports an unbounded, drifting resistance. Each sensor keeps
//! the range of readings it has seen so far and maps the latest reading
//! linearly onto `[0, max angle]` for the joint it is mounted on. Resistance
//! normally goes up with bend; a range whose lower bound sits above its upper
//! bound is treated as reversed polarity and keeps that orientation.

use crate::tracker::{FingerJoint, Side, Tracker, TrackerRole};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::debug;

/// Maximum bend of a proximal finger joint (90°).
pub const PROXIMAL_MAX_ANGLE: f32 = FRAC_PI_2;
/// Maximum bend of an intermediate finger joint (180°).
pub const INTERMEDIATE_MAX_ANGLE: f32 = PI;
/// Maximum bend of a distal finger joint (270°).
pub const DISTAL_MAX_ANGLE: f32 = PI + FRAC_PI_2;
/// Maximum bend of a shoulder (45°).
pub const SHOULDER_MAX_ANGLE: f32 = FRAC_PI_4;
/// Maximum bend for any other role (135°).
pub const DEFAULT_MAX_ANGLE: f32 = FRAC_PI_2 + FRAC_PI_4;
/// Maximum bend when the tracker has no role (180°).
pub const UNASSIGNED_MAX_ANGLE: f32 = PI;

/// Largest angle (radians) a flex reading can map to for a role.
pub fn max_angle_for_role(role: Option<TrackerRole>) -> f32 {
    let Some(role) = role else {
        return UNASSIGNED_MAX_ANGLE;
    };

    if let Some((_, _, joint)) = role.finger_joint() {
        return match joint {
            FingerJoint::Proximal => PROXIMAL_MAX_ANGLE,
            FingerJoint::Intermediate => INTERMEDIATE_MAX_ANGLE,
            FingerJoint::Distal => DISTAL_MAX_ANGLE,
        };
    }

    match role {
        TrackerRole::LeftShoulder | TrackerRole::RightShoulder => SHOULDER_MAX_ANGLE,
        _ => DEFAULT_MAX_ANGLE,
    }
}

/// Axis a flex angle is applied about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexAxis {
    /// Positive rotation about Z: left fingers and the right shoulder
    PositiveZ,
    /// Negative rotation about Z: right fingers and the left shoulder
    NegativeZ,
    /// Pitch about X
    PitchX,
}

impl FlexAxis {
    /// Bend axis for a tracker mounted on `role`.
    pub fn for_role(role: Option<TrackerRole>) -> Self {
        let Some(role) = role else {
            return FlexAxis::PitchX;
        };

        match (role.finger_joint(), role) {
            (Some((Side::Left, _, _)), _) | (None, TrackerRole::RightShoulder) => {
                FlexAxis::PositiveZ
            }
            (Some((Side::Right, _, _)), _) | (None, TrackerRole::LeftShoulder) => {
                FlexAxis::NegativeZ
            }
            _ => FlexAxis::PitchX,
        }
    }

    /// Rotation of `angle` radians about this axis.
    pub fn rotation(self, angle: f32) -> UnitQuaternion<f32> {
        match self {
            FlexAxis::PositiveZ => UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
            FlexAxis::NegativeZ => UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -angle),
            FlexAxis::PitchX => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle),
        }
    }
}

/// How a mapped angle is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnglePolicy {
    /// Readings outside the observed range map outside `[0, max angle]`
    #[default]
    Unclamped,
    /// Mapped angles are clamped into `[0, max angle]`
    Clamped,
}

/// Shape of the calibration range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeState {
    /// At least one bound has not been observed yet
    Uninitialized,
    /// `min <= max`; the range widens outwards
    Normal,
    /// `min > max`; reversed polarity, the lower bound only grows and the
    /// upper bound only shrinks
    Inverted,
}

impl RangeState {
    fn of(min: Option<f32>, max: Option<f32>) -> Self {
        match (min, max) {
            (Some(min), Some(max)) if min > max => RangeState::Inverted,
            (Some(_), Some(_)) => RangeState::Normal,
            _ => RangeState::Uninitialized,
        }
    }
}

/// Self-calibrating flex sensor for one tracker.
#[derive(Debug, Clone, Default)]
pub struct CalibratedFlexSensor {
    min_observed: Option<f32>,
    max_observed: Option<f32>,
    last_raw_value: f32,
    last_angle: f32,
    policy: AnglePolicy,
}

impl CalibratedFlexSensor {
    /// Create an uncalibrated sensor with unclamped angles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uncalibrated sensor with the given angle policy.
    pub fn with_policy(policy: AnglePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Start from a known calibration, e.g. a glove whose resistance drops
    /// with bend (`min > max`).
    pub fn with_calibration(min: f32, max: f32) -> Self {
        Self {
            min_observed: Some(min),
            max_observed: Some(max),
            ..Self::default()
        }
    }

    /// Lower calibration bound, if one has been observed.
    pub fn min_observed(&self) -> Option<f32> {
        self.min_observed
    }

    /// Upper calibration bound, if one has been observed.
    pub fn max_observed(&self) -> Option<f32> {
        self.max_observed
    }

    /// Most recent raw reading; `0.0` before the first one.
    pub fn last_raw_value(&self) -> f32 {
        self.last_raw_value
    }

    /// Angle (radians) produced by the most recent update.
    pub fn last_angle(&self) -> f32 {
        self.last_angle
    }

    /// Current angle policy.
    pub fn policy(&self) -> AnglePolicy {
        self.policy
    }

    /// Change how future angles are bounded.
    pub fn set_policy(&mut self, policy: AnglePolicy) {
        self.policy = policy;
    }

    /// Shape of the current calibration range.
    pub fn range_state(&self) -> RangeState {
        RangeState::of(self.min_observed, self.max_observed)
    }

    /// Feed a raw reading, rotate the tracker accordingly and return the
    /// applied angle in radians.
    pub fn set_reading(&mut self, tracker: &mut Tracker, value: f32) -> f32 {
        self.update_bounds(value);

        let max_angle = max_angle_for_role(tracker.role);
        let angle = self.map_angle(value, max_angle);
        self.set_flex_angle(tracker, angle);

        self.last_raw_value = value;
        angle
    }

    /// Rotate the tracker by an angle (radians) reported directly by the
    /// sensor. Calibration bounds are left untouched.
    pub fn set_flex_angle(&mut self, tracker: &mut Tracker, angle: f32) {
        tracker.set_rotation(FlexAxis::for_role(tracker.role).rotation(angle));
        self.last_angle = angle;
    }

    /// Snap the lower bound to the last reading and re-apply it.
    pub fn reset_min(&mut self, tracker: &mut Tracker) {
        self.min_observed = Some(self.last_raw_value);
        debug!(tracker = %tracker.id(), min = self.last_raw_value, "Flex minimum reset");

        self.set_reading(tracker, self.last_raw_value);
        tracker.data_tick();
    }

    /// Snap the upper bound to the last reading and re-apply it.
    pub fn reset_max(&mut self, tracker: &mut Tracker) {
        self.max_observed = Some(self.last_raw_value);
        debug!(tracker = %tracker.id(), max = self.last_raw_value, "Flex maximum reset");

        self.set_reading(tracker, self.last_raw_value);
        tracker.data_tick();
    }

    // The lower bound is updated first and the upper bound is judged
    // against the updated lower bound.
    fn update_bounds(&mut self, value: f32) {
        let min = match (self.min_observed, self.range_state()) {
            (None, _) => value,
            (Some(min), RangeState::Inverted) => min.max(value),
            (Some(min), _) => min.min(value),
        };
        self.min_observed = Some(min);

        let max = match (self.max_observed, self.range_state()) {
            (None, _) => value,
            (Some(max), RangeState::Inverted) => max.min(value),
            (Some(max), _) => max.max(value),
        };
        self.max_observed = Some(max);
    }

    fn map_angle(&self, value: f32, max_angle: f32) -> f32 {
        let (Some(min), Some(max)) = (self.min_observed, self.max_observed) else {
            return 0.0;
        };
        if min == max {
            return 0.0;
        }

        let angle = max_angle * (value - min) / (max - min);
        match self.policy {
            AnglePolicy::Unclamped => angle,
            AnglePolicy::Clamped => angle.clamp(0.0, max_angle),
        }
    }
}
