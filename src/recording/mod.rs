//! Recording of tracker state over time.
//!
//! This module contains:
//! - Per-tracker frame histories with sparse, index-ordered storage
//! - Recording sessions that keep many streams aligned by tick
//! - Stream summaries for inspecting saved recordings

pub mod frames;
pub mod session;
pub mod summary;

// Re-export commonly used types
pub use frames::{FrameHistory, TrackerFrame, DEFAULT_FRAME_CAPACITY};
pub use session::{
    PoseRecording, RecordingError, RecordingMetadata, TickReport, RECORDING_FORMAT_VERSION,
};
pub use summary::StreamSummary;
