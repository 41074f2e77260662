//! Pose recording sessions.
//!
//! A recording is a set of [`FrameHistory`] streams, one per tracker name,
//! kept index-aligned so that frame `i` of every stream belongs to the same
//! tick.

use crate::recording::frames::{FrameHistory, DEFAULT_FRAME_CAPACITY};
use crate::tracker::Tracker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Current recording format version.
pub const RECORDING_FORMAT_VERSION: &str = "1.0";

/// Errors from saving or loading recordings.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recording metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    pub id: Uuid,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub format_version: String,
}

impl RecordingMetadata {
    /// Metadata for a recording starting now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
            ended_at: None,
            format_version: RECORDING_FORMAT_VERSION.to_string(),
        }
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Frames captured and dropped by one call to [`PoseRecording::record_tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub recorded: usize,
    pub dropped: usize,
}

/// A recorded session of tracker streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseRecording {
    pub metadata: RecordingMetadata,
    streams: Vec<FrameHistory>,
    #[serde(skip, default = "default_capacity")]
    stream_capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_FRAME_CAPACITY
}

fn pad_to(stream: &mut FrameHistory, length: usize) {
    while stream.len() < length {
        stream.push_dropped();
    }
}

impl PoseRecording {
    /// New recording with the default stream capacity.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_stream_capacity(name, DEFAULT_FRAME_CAPACITY)
    }

    /// New recording whose streams pre-allocate `capacity` frames.
    pub fn with_stream_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            metadata: RecordingMetadata::new(name),
            streams: Vec::new(),
            stream_capacity: capacity,
        }
    }

    /// Record one frame for every tracker.
    ///
    /// A tracker seen for the first time gets a new stream, back-filled with
    /// dropped samples for earlier ticks. Streams whose tracker is missing
    /// from this tick get a dropped sample.
    pub fn record_tick<'a, I>(&mut self, trackers: I) -> TickReport
    where
        I: IntoIterator<Item = &'a Tracker>,
    {
        let tick = self.frame_count();
        let mut seen = vec![false; self.streams.len()];
        let mut report = TickReport::default();

        for tracker in trackers {
            let index = match self.streams.iter().position(|s| s.name == tracker.name) {
                Some(index) => index,
                None => {
                    let capacity = self.stream_capacity.max(tick + 1);
                    let mut stream = FrameHistory::with_capacity(tracker.name.clone(), capacity);
                    for _ in 0..tick {
                        stream.push_dropped();
                    }
                    self.streams.push(stream);
                    seen.push(false);
                    self.streams.len() - 1
                }
            };

            // Two trackers sharing a name only record the first one
            if seen[index] {
                continue;
            }
            seen[index] = true;
            self.streams[index].append_frame(tracker);
            report.recorded += 1;
        }

        for (stream, _) in self.streams.iter_mut().zip(seen).filter(|(_, seen)| !seen) {
            stream.push_dropped();
            report.dropped += 1;
        }

        report
    }

    /// Add a prebuilt stream, replacing any stream with the same name.
    ///
    /// Streams are padded with dropped samples until they all share the
    /// same length, so frame `i` of every stream is still tick `i`. The
    /// replaced stream, if any, is returned.
    pub fn add_stream(&mut self, mut stream: FrameHistory) -> Option<FrameHistory> {
        let length = self.frame_count().max(stream.len());
        let replaced = self
            .streams
            .iter()
            .position(|s| s.name == stream.name)
            .map(|index| self.streams.remove(index));

        for existing in self.streams.iter_mut() {
            pad_to(existing, length);
        }
        pad_to(&mut stream, length);
        self.streams.push(stream);

        replaced
    }

    /// Stream recorded under `name`.
    pub fn stream(&self, name: &str) -> Option<&FrameHistory> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// All streams, in the order they were first seen.
    pub fn streams(&self) -> &[FrameHistory] {
        &self.streams
    }

    /// Length of the longest stream.
    pub fn frame_count(&self) -> usize {
        self.streams.iter().map(FrameHistory::len).max().unwrap_or(0)
    }

    /// Placeholder trackers for every stream, in stream order.
    pub fn materialize_trackers(&self) -> Vec<Tracker> {
        self.streams
            .iter()
            .map(FrameHistory::materialize_tracker)
            .collect()
    }

    /// Stamp the end time.
    pub fn finalize(&mut self) {
        self.metadata.ended_at = Some(Utc::now());
    }

    /// Save recording to a file as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), RecordingError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(
            path = %path.display(),
            streams = self.streams.len(),
            frames = self.frame_count(),
            "Recording saved"
        );
        Ok(())
    }

    /// Load recording from a file.
    ///
    /// An unknown format version is logged but loading still proceeds.
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        let content = std::fs::read_to_string(path)?;
        let recording: PoseRecording = serde_json::from_str(&content)?;
        if recording.metadata.format_version != RECORDING_FORMAT_VERSION {
            warn!(
                name = %recording.metadata.name,
                found = %recording.metadata.format_version,
                expected = RECORDING_FORMAT_VERSION,
                "Recording has different format version; some fields may use default values"
            );
        }
        Ok(recording)
    }
}
