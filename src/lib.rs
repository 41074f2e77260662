//! Tracker Fusion - input layer for full-body motion tracking.
//!
//! This library decides which tracker drives each hand of the skeleton,
//! turns raw flex sensor readings into calibrated joint rotations, and
//! records per-tracker history for playback and analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Tracker Fusion                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ Sensor Feed │──▶│    Flex     │──▶│  Trackers   │        │
//! │  │ (transport) │   │ Calibration │   │ (registry)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                        │         │          │
//! │                                        ▼         ▼          │
//! │                              ┌─────────────┐ ┌───────────┐  │
//! │                              │ Hand Source │ │  Frame    │  │
//! │                              │  Arbiter    │ │ Recording │  │
//! │                              └─────────────┘ └───────────┘  │
//! │                                     │                       │
//! │                                     ▼                       │
//! │                              ┌─────────────┐                │
//! │                              │  Skeleton   │                │
//! │                              │ hand slots  │                │
//! │                              └─────────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tracker_fusion::{InputPipeline, SensorEvent, Tracker, TrackerRole};
//!
//! let mut pipeline = InputPipeline::default();
//! let finger = pipeline.register_flex_tracker(
//!     Tracker::new("glove-l-index", Some(TrackerRole::LeftIndexProximal))
//!         .with_rotation_capability(),
//! );
//!
//! pipeline.handle_event(SensorEvent::flex_reading(finger, 2.0));
//! pipeline.handle_event(SensorEvent::flex_reading(finger, 4.0));
//! pipeline.tick();
//! ```

pub mod config;
pub mod core;
pub mod recording;
pub mod stats;
pub mod tracker;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{
    AnglePolicy, CalibratedFlexSensor, HandSourceArbiter, InputPipeline, SkeletonModel,
};
pub use recording::{FrameHistory, PoseRecording, RecordingError, StreamSummary, TrackerFrame};
pub use stats::{PipelineStats, SharedPipelineStats};
pub use tracker::{
    SensorEvent, SensorFeed, Tracker, TrackerId, TrackerRegistry, TrackerRole, TrackerStatus,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors from operations that touch both configuration and recordings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),
}

pub type Result<T> = std::result::Result<T, Error>;
