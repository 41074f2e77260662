//! Tracker model: roles, the tracker entity, the live registry and the
//! sensor event feed that carries raw readings to the pipeline.

pub mod feed;
pub mod registry;
pub mod role;
pub mod types;

// Re-export commonly used types
pub use feed::{FeedError, FeedSender, SensorEvent, SensorFeed, DEFAULT_FEED_CAPACITY};
pub use registry::TrackerRegistry;
pub use role::{Finger, FingerJoint, Side, TrackerRole, UnknownRole};
pub use types::{next_local_tracker_id, Tracker, TrackerId, TrackerStatus};
