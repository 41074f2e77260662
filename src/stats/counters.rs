//! Pipeline activity counters.
//!
//! Counts what the input pipeline has processed so operators can see that
//! sensors and recorders are alive. Counters can be persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Activity counters for the current session.
#[derive(Debug)]
pub struct PipelineStats {
    /// Flex readings applied to trackers
    flex_readings: AtomicU64,
    /// Direct flex angles applied to trackers
    flex_angles: AtomicU64,
    /// Calibration bound resets
    calibration_resets: AtomicU64,
    /// Events addressed to unknown or non-flex trackers
    ignored_events: AtomicU64,
    /// Hand source arbitration passes
    arbiter_ticks: AtomicU64,
    /// Frames captured into recordings
    frames_recorded: AtomicU64,
    /// Dropped samples written into recordings
    frames_dropped: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl PipelineStats {
    /// Create zeroed, in-memory stats.
    pub fn new() -> Self {
        Self {
            flex_readings: AtomicU64::new(0),
            flex_angles: AtomicU64::new(0),
            calibration_resets: AtomicU64::new(0),
            ignored_events: AtomicU64::new(0),
            arbiter_ticks: AtomicU64::new(0),
            frames_recorded: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create stats that load from and save to `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            warn!("Could not load previous pipeline stats: {e}");
        }

        stats
    }

    /// Record a raw flex reading.
    pub fn record_flex_reading(&self) {
        self.flex_readings.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a directly reported flex angle.
    pub fn record_flex_angle(&self) {
        self.flex_angles.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a calibration bound reset.
    pub fn record_calibration_reset(&self) {
        self.calibration_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an event that matched no flex tracker.
    pub fn record_ignored_event(&self) {
        self.ignored_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an arbitration pass.
    pub fn record_arbiter_tick(&self) {
        self.arbiter_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one recording tick.
    pub fn record_frames(&self, recorded: u64, dropped: u64) {
        self.frames_recorded.fetch_add(recorded, Ordering::Relaxed);
        self.frames_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            flex_readings: self.flex_readings.load(Ordering::Relaxed),
            flex_angles: self.flex_angles.load(Ordering::Relaxed),
            calibration_resets: self.calibration_resets.load(Ordering::Relaxed),
            ignored_events: self.ignored_events.load(Ordering::Relaxed),
            arbiter_ticks: self.arbiter_ticks.load(Ordering::Relaxed),
            frames_recorded: self.frames_recorded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Flex readings applied: {}\n\
             - Flex angles applied: {}\n\
             - Calibration resets: {}\n\
             - Ignored sensor events: {}\n\
             - Arbiter ticks: {}\n\
             - Frames recorded: {}\n\
             - Frames dropped: {}\n\
             - Session duration: {} seconds",
            stats.flex_readings,
            stats.flex_angles,
            stats.calibration_resets,
            stats.ignored_events,
            stats.arbiter_ticks,
            stats.frames_recorded,
            stats.frames_dropped,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                flex_readings: stats.flex_readings,
                flex_angles: stats.flex_angles,
                calibration_resets: stats.calibration_resets,
                ignored_events: stats.ignored_events,
                arbiter_ticks: stats.arbiter_ticks,
                frames_recorded: stats.frames_recorded,
                frames_dropped: stats.frames_dropped,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.flex_readings
                    .store(persisted.flex_readings, Ordering::Relaxed);
                self.flex_angles
                    .store(persisted.flex_angles, Ordering::Relaxed);
                self.calibration_resets
                    .store(persisted.calibration_resets, Ordering::Relaxed);
                self.ignored_events
                    .store(persisted.ignored_events, Ordering::Relaxed);
                self.arbiter_ticks
                    .store(persisted.arbiter_ticks, Ordering::Relaxed);
                self.frames_recorded
                    .store(persisted.frames_recorded, Ordering::Relaxed);
                self.frames_dropped
                    .store(persisted.frames_dropped, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.flex_readings.store(0, Ordering::Relaxed);
        self.flex_angles.store(0, Ordering::Relaxed);
        self.calibration_resets.store(0, Ordering::Relaxed);
        self.ignored_events.store(0, Ordering::Relaxed);
        self.arbiter_ticks.store(0, Ordering::Relaxed);
        self.frames_recorded.store(0, Ordering::Relaxed);
        self.frames_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub flex_readings: u64,
    pub flex_angles: u64,
    pub calibration_resets: u64,
    pub ignored_events: u64,
    pub arbiter_ticks: u64,
    pub frames_recorded: u64,
    pub frames_dropped: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    flex_readings: u64,
    #[serde(default)]
    flex_angles: u64,
    calibration_resets: u64,
    ignored_events: u64,
    arbiter_ticks: u64,
    frames_recorded: u64,
    frames_dropped: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats.
pub type SharedPipelineStats = Arc<PipelineStats>;

/// Create shared stats that are never persisted.
pub fn create_shared_stats() -> SharedPipelineStats {
    Arc::new(PipelineStats::new())
}

/// Create shared stats backed by a file.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedPipelineStats {
    Arc::new(PipelineStats::with_persistence(path))
}
