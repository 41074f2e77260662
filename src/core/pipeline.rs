//! The tracker input pipeline.
//!
//! Owns the live trackers, one calibrated flex sensor per flex-equipped
//! tracker, the skeleton's hand slots and an optional recording. All
//! mutation happens on the thread that owns the pipeline; sensor events from
//! other threads arrive through a [`SensorFeed`](crate::tracker::SensorFeed).

use crate::config::Config;
use crate::core::arbiter::HandSourceArbiter;
use crate::core::flex::{AnglePolicy, CalibratedFlexSensor};
use crate::core::skeleton::SkeletonModel;
use crate::recording::{PoseRecording, DEFAULT_FRAME_CAPACITY};
use crate::stats::{create_shared_stats, SharedPipelineStats};
use crate::tracker::{SensorEvent, Tracker, TrackerId, TrackerRegistry};
use crate::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Tick-driven input fusion pipeline.
pub struct InputPipeline {
    registry: TrackerRegistry,
    flex_sensors: HashMap<TrackerId, CalibratedFlexSensor>,
    skeleton: SkeletonModel,
    arbiter: HandSourceArbiter,
    recording: Option<PoseRecording>,
    angle_policy: AnglePolicy,
    frame_capacity: usize,
    stats: SharedPipelineStats,
}

impl InputPipeline {
    /// Create an empty pipeline with default settings.
    pub fn new(stats: SharedPipelineStats) -> Self {
        Self {
            registry: TrackerRegistry::new(),
            flex_sensors: HashMap::new(),
            skeleton: SkeletonModel::new(),
            arbiter: HandSourceArbiter::new(),
            recording: None,
            angle_policy: AnglePolicy::default(),
            frame_capacity: DEFAULT_FRAME_CAPACITY,
            stats,
        }
    }

    /// Create an empty pipeline using the configured angle policy, frame
    /// capacity and hand source substitution.
    pub fn from_config(config: &Config, stats: SharedPipelineStats) -> Self {
        let mut pipeline = Self::new(stats);
        pipeline.angle_policy = config.flex.angle_policy;
        pipeline.frame_capacity = config.recording.initial_capacity;
        pipeline
            .arbiter
            .set_enabled(config.hand_source_substitution);
        pipeline
    }

    /// Register a tracker without a flex sensor.
    pub fn register_tracker(&mut self, tracker: Tracker) -> TrackerId {
        let id = self.registry.register(tracker);
        debug!(tracker = %id, "Tracker registered");
        id
    }

    /// Register a tracker driven by a flex sensor.
    pub fn register_flex_tracker(&mut self, tracker: Tracker) -> TrackerId {
        let id = self.register_tracker(tracker);
        self.flex_sensors
            .insert(id, CalibratedFlexSensor::with_policy(self.angle_policy));
        id
    }

    /// Attach a fresh flex sensor to an already registered tracker.
    ///
    /// Returns `false` if no such tracker exists.
    pub fn attach_flex_sensor(&mut self, id: TrackerId) -> bool {
        if self.registry.get(id).is_none() {
            return false;
        }
        self.flex_sensors
            .insert(id, CalibratedFlexSensor::with_policy(self.angle_policy));
        true
    }

    /// Flex sensor attached to a tracker.
    pub fn flex_sensor(&self, id: TrackerId) -> Option<&CalibratedFlexSensor> {
        self.flex_sensors.get(&id)
    }

    /// Route a sensor event to its tracker.
    ///
    /// Events for unknown trackers, or trackers without a flex sensor, are
    /// logged and dropped. Returns whether the event was applied.
    pub fn handle_event(&mut self, event: SensorEvent) -> bool {
        let id = event.tracker();
        let (Some(sensor), Some(tracker)) =
            (self.flex_sensors.get_mut(&id), self.registry.get_mut(id))
        else {
            warn!(tracker = %id, "Ignoring sensor event for unknown flex tracker");
            self.stats.record_ignored_event();
            return false;
        };

        match event {
            SensorEvent::FlexReading { value, .. } => {
                sensor.set_reading(tracker, value);
                self.stats.record_flex_reading();
            }
            SensorEvent::FlexAngle { angle, .. } => {
                sensor.set_flex_angle(tracker, angle);
                self.stats.record_flex_angle();
            }
            SensorEvent::ResetFlexMin { .. } => {
                sensor.reset_min(tracker);
                self.stats.record_calibration_reset();
            }
            SensorEvent::ResetFlexMax { .. } => {
                sensor.reset_max(tracker);
                self.stats.record_calibration_reset();
            }
        }
        true
    }

    /// Run one pipeline tick: refresh hand sources, then record a frame.
    pub fn tick(&mut self) {
        self.arbiter
            .update(self.registry.all_trackers(), &mut self.skeleton);
        if self.arbiter.is_enabled() {
            self.stats.record_arbiter_tick();
        }

        if let Some(recording) = self.recording.as_mut() {
            let report = recording.record_tick(self.registry.all_trackers());
            self.stats
                .record_frames(report.recorded as u64, report.dropped as u64);
        }
    }

    /// Enable hand source substitution. Disabling is ignored.
    pub fn set_hand_source_substitution(&mut self, enabled: bool) {
        self.arbiter.set_enabled(enabled);
    }

    /// Begin recording. An active recording is finalized and returned.
    pub fn start_recording(&mut self, name: impl Into<String>) -> Option<PoseRecording> {
        let previous = self.stop_recording();
        let recording = PoseRecording::with_stream_capacity(name, self.frame_capacity);
        info!(id = %recording.metadata.id, name = %recording.metadata.name, "Recording started");
        self.recording = Some(recording);
        previous
    }

    /// Stop recording and hand back the finalized session.
    pub fn stop_recording(&mut self) -> Option<PoseRecording> {
        let mut recording = self.recording.take()?;
        recording.finalize();
        info!(
            id = %recording.metadata.id,
            frames = recording.frame_count(),
            "Recording stopped"
        );
        Some(recording)
    }

    /// Stop recording and save it as `recording_<timestamp>_<id>.json` under
    /// the configured export directory.
    ///
    /// Returns the saved file, or `None` when nothing was being recorded.
    pub fn export_recording(&mut self, config: &Config) -> Result<Option<PathBuf>> {
        let Some(recording) = self.stop_recording() else {
            return Ok(None);
        };

        config.ensure_directories()?;
        let path = config.export_path.join(format!(
            "recording_{}_{}.json",
            recording.metadata.started_at.format("%Y%m%d_%H%M%S"),
            recording.metadata.id.simple()
        ));
        recording.save(&path)?;
        Ok(Some(path))
    }

    /// Whether a recording is active.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The active recording, if any.
    pub fn recording(&self) -> Option<&PoseRecording> {
        self.recording.as_ref()
    }

    /// Live trackers.
    pub fn registry(&self) -> &TrackerRegistry {
        &self.registry
    }

    /// Mutable access for producers such as network deserialization.
    pub fn registry_mut(&mut self) -> &mut TrackerRegistry {
        &mut self.registry
    }

    /// Skeleton hand slots written by the arbiter.
    pub fn skeleton(&self) -> &SkeletonModel {
        &self.skeleton
    }

    /// Hand source arbiter.
    pub fn arbiter(&self) -> &HandSourceArbiter {
        &self.arbiter
    }

    /// Shared activity counters.
    pub fn stats(&self) -> &SharedPipelineStats {
        &self.stats
    }
}

impl Default for InputPipeline {
    fn default() -> Self {
        Self::new(create_shared_stats())
    }
}
