//! Per-stream statistics over a recording.

use crate::recording::frames::FrameHistory;
use crate::tracker::TrackerRole;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of one recorded stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub name: String,
    pub role: Option<TrackerRole>,
    pub total_frames: usize,
    pub valid_frames: usize,
    pub dropped_frames: usize,
    /// Mean rotation angle in degrees over frames that carry a rotation
    pub mean_rotation_deg: Option<f64>,
    /// Sample standard deviation of the rotation angle in degrees
    pub rotation_std_dev_deg: Option<f64>,
}

impl StreamSummary {
    /// Summarize one stream.
    pub fn from_history(history: &FrameHistory) -> Self {
        let angles: Vec<f64> = history
            .iter()
            .flatten()
            .filter_map(|frame| frame.rotation)
            .map(|rotation| f64::from(rotation.angle()).to_degrees())
            .collect();

        let mean_rotation_deg = (!angles.is_empty()).then(|| angles.iter().mean());
        let rotation_std_dev_deg = (angles.len() > 1).then(|| angles.iter().std_dev());

        let valid_frames = history.valid_count();
        Self {
            name: history.name.clone(),
            role: history.first_valid_frame().and_then(|f| f.role),
            total_frames: history.len(),
            valid_frames,
            dropped_frames: history.len() - valid_frames,
            mean_rotation_deg,
            rotation_std_dev_deg,
        }
    }

    /// Fraction of slots that hold a frame.
    pub fn coverage(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.valid_frames as f64 / self.total_frames as f64
    }
}
