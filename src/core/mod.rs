//! Core functionality of the tracker input layer.
//!
//! This module contains:
//! - Flex sensor calibration into joint rotations
//! - Hand source arbitration between controllers and hand tracking
//! - The skeleton slots the arbiter writes into
//! - The tick-driven pipeline tying them together

pub mod arbiter;
pub mod flex;
pub mod pipeline;
pub mod skeleton;

// Re-export commonly used types
pub use arbiter::{Activation, HandSelection, HandSourceArbiter};
pub use flex::{max_angle_for_role, AnglePolicy, CalibratedFlexSensor, FlexAxis, RangeState};
pub use pipeline::InputPipeline;
pub use skeleton::SkeletonModel;
