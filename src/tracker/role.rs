//! Anatomical roles a tracker can be assigned to.
//!
//! Roles cover the body trunk and limbs, handheld controllers, and every
//! finger joint a glove can report. The snake_case names are used for
//! serialization, display and CLI parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Finger of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

/// Phalanx joint of a finger, from the palm outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerJoint {
    Proximal,
    Intermediate,
    Distal,
}

macro_rules! tracker_roles {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Anatomical role of a tracker.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum TrackerRole {
            $($variant),+
        }

        impl TrackerRole {
            /// Every role, in declaration order.
            pub const ALL: &'static [TrackerRole] = &[$(TrackerRole::$variant),+];

            /// Stable snake_case name of the role.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(TrackerRole::$variant => $name),+
                }
            }
        }
    };
}

tracker_roles! {
    Head => "head",
    Neck => "neck",
    Chest => "chest",
    Waist => "waist",
    Hip => "hip",
    LeftUpperLeg => "left_upper_leg",
    RightUpperLeg => "right_upper_leg",
    LeftLowerLeg => "left_lower_leg",
    RightLowerLeg => "right_lower_leg",
    LeftFoot => "left_foot",
    RightFoot => "right_foot",
    LeftShoulder => "left_shoulder",
    RightShoulder => "right_shoulder",
    LeftUpperArm => "left_upper_arm",
    RightUpperArm => "right_upper_arm",
    LeftLowerArm => "left_lower_arm",
    RightLowerArm => "right_lower_arm",
    LeftHand => "left_hand",
    RightHand => "right_hand",
    LeftController => "left_controller",
    RightController => "right_controller",
    LeftThumbProximal => "left_thumb_proximal",
    LeftThumbIntermediate => "left_thumb_intermediate",
    LeftThumbDistal => "left_thumb_distal",
    LeftIndexProximal => "left_index_proximal",
    LeftIndexIntermediate => "left_index_intermediate",
    LeftIndexDistal => "left_index_distal",
    LeftMiddleProximal => "left_middle_proximal",
    LeftMiddleIntermediate => "left_middle_intermediate",
    LeftMiddleDistal => "left_middle_distal",
    LeftRingProximal => "left_ring_proximal",
    LeftRingIntermediate => "left_ring_intermediate",
    LeftRingDistal => "left_ring_distal",
    LeftLittleProximal => "left_little_proximal",
    LeftLittleIntermediate => "left_little_intermediate",
    LeftLittleDistal => "left_little_distal",
    RightThumbProximal => "right_thumb_proximal",
    RightThumbIntermediate => "right_thumb_intermediate",
    RightThumbDistal => "right_thumb_distal",
    RightIndexProximal => "right_index_proximal",
    RightIndexIntermediate => "right_index_intermediate",
    RightIndexDistal => "right_index_distal",
    RightMiddleProximal => "right_middle_proximal",
    RightMiddleIntermediate => "right_middle_intermediate",
    RightMiddleDistal => "right_middle_distal",
    RightRingProximal => "right_ring_proximal",
    RightRingIntermediate => "right_ring_intermediate",
    RightRingDistal => "right_ring_distal",
    RightLittleProximal => "right_little_proximal",
    RightLittleIntermediate => "right_little_intermediate",
    RightLittleDistal => "right_little_distal",
}

impl TrackerRole {
    /// Side, finger and joint for finger roles; `None` for everything else.
    pub fn finger_joint(self) -> Option<(Side, Finger, FingerJoint)> {
        use FingerJoint::*;
        use Side::*;
        use TrackerRole as R;

        let joint = match self {
            R::LeftThumbProximal => (Left, Finger::Thumb, Proximal),
            R::LeftThumbIntermediate => (Left, Finger::Thumb, Intermediate),
            R::LeftThumbDistal => (Left, Finger::Thumb, Distal),
            R::LeftIndexProximal => (Left, Finger::Index, Proximal),
            R::LeftIndexIntermediate => (Left, Finger::Index, Intermediate),
            R::LeftIndexDistal => (Left, Finger::Index, Distal),
            R::LeftMiddleProximal => (Left, Finger::Middle, Proximal),
            R::LeftMiddleIntermediate => (Left, Finger::Middle, Intermediate),
            R::LeftMiddleDistal => (Left, Finger::Middle, Distal),
            R::LeftRingProximal => (Left, Finger::Ring, Proximal),
            R::LeftRingIntermediate => (Left, Finger::Ring, Intermediate),
            R::LeftRingDistal => (Left, Finger::Ring, Distal),
            R::LeftLittleProximal => (Left, Finger::Little, Proximal),
            R::LeftLittleIntermediate => (Left, Finger::Little, Intermediate),
            R::LeftLittleDistal => (Left, Finger::Little, Distal),
            R::RightThumbProximal => (Right, Finger::Thumb, Proximal),
            R::RightThumbIntermediate => (Right, Finger::Thumb, Intermediate),
            R::RightThumbDistal => (Right, Finger::Thumb, Distal),
            R::RightIndexProximal => (Right, Finger::Index, Proximal),
            R::RightIndexIntermediate => (Right, Finger::Index, Intermediate),
            R::RightIndexDistal => (Right, Finger::Index, Distal),
            R::RightMiddleProximal => (Right, Finger::Middle, Proximal),
            R::RightMiddleIntermediate => (Right, Finger::Middle, Intermediate),
            R::RightMiddleDistal => (Right, Finger::Middle, Distal),
            R::RightRingProximal => (Right, Finger::Ring, Proximal),
            R::RightRingIntermediate => (Right, Finger::Ring, Intermediate),
            R::RightRingDistal => (Right, Finger::Ring, Distal),
            R::RightLittleProximal => (Right, Finger::Little, Proximal),
            R::RightLittleIntermediate => (Right, Finger::Little, Intermediate),
            R::RightLittleDistal => (Right, Finger::Little, Distal),
            _ => return None,
        };
        Some(joint)
    }

    /// Whether this role is a finger joint.
    pub fn is_finger(self) -> bool {
        self.finger_joint().is_some()
    }

    /// Body side of the role, if it has one.
    pub fn side(self) -> Option<Side> {
        if let Some((side, _, _)) = self.finger_joint() {
            return Some(side);
        }
        match self {
            TrackerRole::LeftUpperLeg
            | TrackerRole::LeftLowerLeg
            | TrackerRole::LeftFoot
            | TrackerRole::LeftShoulder
            | TrackerRole::LeftUpperArm
            | TrackerRole::LeftLowerArm
            | TrackerRole::LeftHand
            | TrackerRole::LeftController => Some(Side::Left),
            TrackerRole::RightUpperLeg
            | TrackerRole::RightLowerLeg
            | TrackerRole::RightFoot
            | TrackerRole::RightShoulder
            | TrackerRole::RightUpperArm
            | TrackerRole::RightLowerArm
            | TrackerRole::RightHand
            | TrackerRole::RightController => Some(Side::Right),
            _ => None,
        }
    }

    /// Handheld controller role for a side.
    pub fn controller(side: Side) -> Self {
        match side {
            Side::Left => TrackerRole::LeftController,
            Side::Right => TrackerRole::RightController,
        }
    }

    /// Hand role for a side.
    pub fn hand(side: Side) -> Self {
        match side {
            Side::Left => TrackerRole::LeftHand,
            Side::Right => TrackerRole::RightHand,
        }
    }
}

impl fmt::Display for TrackerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tracker role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for TrackerRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        TrackerRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == needle)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
