//! Integration tests for pose recordings

use nalgebra::{UnitQuaternion, Vector3};
use tracker_fusion::recording::{FrameHistory, RECORDING_FORMAT_VERSION};
use tracker_fusion::{
    InputPipeline, PoseRecording, SensorEvent, StreamSummary, Tracker, TrackerFrame, TrackerRole,
    TrackerStatus,
};

fn frame(role: TrackerRole) -> TrackerFrame {
    TrackerFrame {
        role: Some(role),
        rotation: Some(UnitQuaternion::identity()),
        ..TrackerFrame::EMPTY
    }
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions").join("take1.json");

    let mut pipeline = InputPipeline::default();
    let finger = pipeline.register_flex_tracker(
        Tracker::new("glove-l-index-1", Some(TrackerRole::LeftIndexProximal))
            .with_rotation_capability(),
    );
    let mut chest = Tracker::new("chest", Some(TrackerRole::Chest))
        .with_position_capability()
        .with_rotation_capability();
    chest.set_position(Vector3::new(0.0, 1.3, 0.0));
    pipeline.register_tracker(chest);

    pipeline.start_recording("take1");
    for value in [10.0, 20.0, 15.0] {
        pipeline.handle_event(SensorEvent::flex_reading(finger, value));
        pipeline.tick();
    }
    let recording = pipeline.stop_recording().unwrap();
    recording.save(&path).unwrap();

    let loaded = PoseRecording::load(&path).unwrap();
    assert_eq!(loaded.metadata.id, recording.metadata.id);
    assert_eq!(loaded.metadata.name, "take1");
    assert_eq!(loaded.metadata.format_version, RECORDING_FORMAT_VERSION);
    assert!(loaded.metadata.ended_at.is_some());
    assert_eq!(loaded.frame_count(), 3);
    assert_eq!(loaded.streams(), recording.streams());

    let chest = loaded.stream("chest").unwrap();
    let position = chest.frame_at(0).and_then(|f| f.position).unwrap();
    assert!((position.y - 1.3).abs() < 1e-6);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(PoseRecording::load(&dir.path().join("nope.json")).is_err());
}

#[test]
fn test_load_other_format_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.json");

    let mut recording = PoseRecording::new("old");
    recording.metadata.format_version = "0.9".to_string();
    recording.save(&path).unwrap();

    let loaded = PoseRecording::load(&path).unwrap();
    assert_eq!(loaded.metadata.format_version, "0.9");
}

#[test]
fn test_first_valid_frame_skips_dropped() {
    let a = frame(TrackerRole::LeftFoot);
    let b = frame(TrackerRole::RightFoot);
    let history = FrameHistory::from_frames("feet", vec![None, None, Some(a), Some(b)]);

    assert_eq!(history.first_valid_frame(), Some(&a));
    assert_eq!(history.valid_count(), 2);
    assert_eq!(history.frame_at(0), None);
    assert_eq!(history.frame_at(3), Some(&b));
}

#[test]
fn test_materialize_from_first_valid_frame() {
    let history = FrameHistory::from_frames(
        "shin-l",
        vec![None, Some(frame(TrackerRole::LeftLowerLeg))],
    );
    let tracker = history.materialize_tracker();

    assert_eq!(tracker.name, "shin-l");
    assert_eq!(tracker.role, Some(TrackerRole::LeftLowerLeg));
    assert!(tracker.has_rotation);
    assert!(!tracker.has_position);
    assert!(tracker.is_internal);
    assert!(tracker.is_computed);
    assert_eq!(tracker.status, TrackerStatus::Ok);
}

#[test]
fn test_materialize_empty_history() {
    let history = FrameHistory::new("ghost");
    let first = history.materialize_tracker();
    let second = history.materialize_tracker();

    assert_eq!(first.role, None);
    assert!(!first.has_position && !first.has_rotation && !first.has_acceleration);
    assert_eq!(first.status, TrackerStatus::Ok);
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_late_tracker_is_backfilled() {
    let head = Tracker::new("head", Some(TrackerRole::Head)).with_rotation_capability();
    let hip = Tracker::new("hip", Some(TrackerRole::Hip)).with_rotation_capability();

    let mut recording = PoseRecording::new("late");
    recording.record_tick([&head]);
    recording.record_tick([&head]);
    recording.record_tick([&head, &hip]);

    let hip_stream = recording.stream("hip").unwrap();
    assert_eq!(hip_stream.len(), 3);
    assert_eq!(hip_stream.valid_count(), 1);
    assert_eq!(hip_stream.first_valid_frame().and_then(|f| f.role), Some(TrackerRole::Hip));

    let summary = StreamSummary::from_history(hip_stream);
    assert_eq!(summary.dropped_frames, 2);
    assert!((summary.coverage() - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_imported_stream_stays_aligned_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("merged.json");
    let head = Tracker::new("head", Some(TrackerRole::Head)).with_rotation_capability();

    let mut recording = PoseRecording::new("merged");
    recording.record_tick([&head]);
    recording.record_tick([&head]);
    let glove = FrameHistory::from_frames("glove", vec![Some(frame(TrackerRole::LeftHand))]);
    recording.add_stream(glove);
    recording.record_tick([&head]);
    recording.save(&path).unwrap();

    let loaded = PoseRecording::load(&path).unwrap();
    assert_eq!(loaded.frame_count(), 3);
    let glove = loaded.stream("glove").unwrap();
    assert_eq!(glove.len(), 3);
    assert!(glove.frame_at(0).is_some());
    assert!(glove.frame_at(2).is_none());
}
