//! Integration tests for the tracker input pipeline

use nalgebra::Vector3;
use std::f32::consts::{FRAC_PI_2, PI};
use std::thread;
use tracker_fusion::core::{HandSourceArbiter, RangeState};
use tracker_fusion::stats::create_shared_stats;
use tracker_fusion::tracker::Side;
use tracker_fusion::{
    Config, InputPipeline, SensorEvent, SensorFeed, Tracker, TrackerId, TrackerRole,
};

fn live(name: &str, role: TrackerRole, position: Vector3<f32>) -> Tracker {
    let mut tracker = Tracker::new(name, Some(role))
        .with_position_capability()
        .with_rotation_capability();
    tracker.set_position(position);
    tracker
}

fn enabled_pipeline() -> InputPipeline {
    let mut config = Config::default();
    config.hand_source_substitution = true;
    InputPipeline::from_config(&config, create_shared_stats())
}

#[test]
fn test_controller_drives_hand_when_no_hand_tracking() {
    let mut pipeline = enabled_pipeline();
    let left = pipeline.register_tracker(live(
        "ctrl-l",
        TrackerRole::LeftController,
        Vector3::new(-0.3, 1.0, 0.2),
    ));

    pipeline.tick();

    assert_eq!(pipeline.skeleton().hand_source(Side::Left), Some(left));
    assert_eq!(pipeline.skeleton().hand_source(Side::Right), None);
}

#[test]
fn test_hand_tracking_overrides_controller_registered_first() {
    let mut pipeline = enabled_pipeline();
    pipeline.register_tracker(live(
        "ctrl-r",
        TrackerRole::RightController,
        Vector3::new(0.3, 1.0, 0.2),
    ));
    let hand = pipeline.register_tracker(live(
        "hand-r",
        TrackerRole::RightHand,
        Vector3::new(0.3, 1.05, 0.25),
    ));

    pipeline.tick();

    assert_eq!(pipeline.skeleton().hand_source(Side::Right), Some(hand));
}

#[test]
fn test_hand_tracking_alone_is_not_selected() {
    let mut pipeline = enabled_pipeline();
    pipeline.register_tracker(live(
        "hand-l",
        TrackerRole::LeftHand,
        Vector3::new(-0.3, 1.05, 0.25),
    ));

    pipeline.tick();

    assert_eq!(pipeline.skeleton().hand_source(Side::Left), None);
}

#[test]
fn test_hand_registered_before_controller_loses() {
    let mut pipeline = enabled_pipeline();
    pipeline.register_tracker(live(
        "hand-l",
        TrackerRole::LeftHand,
        Vector3::new(-0.3, 1.05, 0.25),
    ));
    let controller = pipeline.register_tracker(live(
        "ctrl-l",
        TrackerRole::LeftController,
        Vector3::new(-0.3, 1.0, 0.2),
    ));

    pipeline.tick();

    assert_eq!(pipeline.skeleton().hand_source(Side::Left), Some(controller));
}

#[test]
fn test_disabled_arbiter_leaves_skeleton_untouched() {
    let mut pipeline = InputPipeline::default();
    pipeline.register_tracker(live(
        "ctrl-l",
        TrackerRole::LeftController,
        Vector3::new(-0.3, 1.0, 0.2),
    ));

    pipeline.tick();
    assert_eq!(pipeline.skeleton().hand_source(Side::Left), None);
    assert_eq!(pipeline.stats().snapshot().arbiter_ticks, 0);

    pipeline.set_hand_source_substitution(true);
    pipeline.set_hand_source_substitution(false);
    pipeline.tick();

    assert!(pipeline.arbiter().is_enabled());
    assert!(pipeline.skeleton().hand_source(Side::Left).is_some());
}

#[test]
fn test_lost_tracking_clears_slot_on_next_tick() {
    let mut pipeline = enabled_pipeline();
    let controller = pipeline.register_tracker(live(
        "ctrl-l",
        TrackerRole::LeftController,
        Vector3::new(-0.3, 1.0, 0.2),
    ));
    pipeline.tick();
    assert_eq!(pipeline.skeleton().hand_source(Side::Left), Some(controller));

    if let Some(tracker) = pipeline.registry_mut().get_mut(controller) {
        tracker.set_position(Vector3::zeros());
    }
    pipeline.tick();

    assert_eq!(pipeline.skeleton().hand_source(Side::Left), None);
}

#[test]
fn test_select_skips_trackers_without_role() {
    let trackers = vec![
        {
            let mut t = Tracker::new("anon", None).with_position_capability();
            t.set_position(Vector3::new(1.0, 1.0, 1.0));
            t
        },
        live("ctrl-r", TrackerRole::RightController, Vector3::new(0.3, 1.0, 0.2)),
    ];

    let selection = HandSourceArbiter::select(&trackers);
    assert_eq!(selection.left, None);
    assert_eq!(selection.right, Some(trackers[1].id()));
}

#[test]
fn test_flex_sequence_through_pipeline() {
    let mut pipeline = InputPipeline::default();
    let finger = pipeline.register_flex_tracker(
        Tracker::new("glove-l-index-2", Some(TrackerRole::LeftIndexIntermediate))
            .with_rotation_capability(),
    );

    let expected = [0.0, PI, PI, PI / 2.0];
    for (value, angle) in [2.0, 4.0, 6.0, 4.0].into_iter().zip(expected) {
        pipeline.handle_event(SensorEvent::flex_reading(finger, value));
        let sensor = pipeline.flex_sensor(finger).unwrap();
        assert!(
            (sensor.last_angle() - angle).abs() < 1e-5,
            "reading {value}: got {}, expected {angle}",
            sensor.last_angle()
        );
    }

    let sensor = pipeline.flex_sensor(finger).unwrap();
    assert_eq!(sensor.min_observed(), Some(2.0));
    assert_eq!(sensor.max_observed(), Some(6.0));
    assert_eq!(sensor.range_state(), RangeState::Normal);
}

#[test]
fn test_reset_max_pins_current_reading_to_full_bend() {
    let mut pipeline = InputPipeline::default();
    let finger = pipeline.register_flex_tracker(
        Tracker::new("glove-r-thumb-1", Some(TrackerRole::RightThumbProximal))
            .with_rotation_capability(),
    );

    for value in [1.0, 5.0, 3.0] {
        pipeline.handle_event(SensorEvent::flex_reading(finger, value));
    }
    pipeline.handle_event(SensorEvent::ResetFlexMax { tracker: finger });

    let sensor = pipeline.flex_sensor(finger).unwrap();
    assert_eq!(sensor.max_observed(), Some(3.0));
    assert!((sensor.last_angle() - FRAC_PI_2).abs() < 1e-5);

    let tracker = pipeline.registry().get(finger).unwrap();
    assert_eq!(tracker.data_ticks(), 1);
    // Right fingers bend about -Z
    let axis = tracker.rotation.axis().unwrap();
    assert!((axis.z + 1.0).abs() < 1e-5);
}

#[test]
fn test_events_from_producer_thread() {
    let mut pipeline = InputPipeline::default();
    let ids: Vec<TrackerId> = [
        TrackerRole::LeftIndexProximal,
        TrackerRole::LeftMiddleProximal,
        TrackerRole::LeftShoulder,
    ]
    .into_iter()
    .map(|role| {
        pipeline.register_flex_tracker(
            Tracker::new(format!("flex-{role}"), Some(role)).with_rotation_capability(),
        )
    })
    .collect();

    let feed = SensorFeed::new(64);
    let sender = feed.sender();
    let producer_ids = ids.clone();
    let producer = thread::spawn(move || {
        for value in [100.0, 300.0, 200.0] {
            for id in &producer_ids {
                sender
                    .send(SensorEvent::flex_reading(*id, value))
                    .expect("feed open");
            }
        }
    });
    producer.join().unwrap();

    let applied = feed
        .drain()
        .into_iter()
        .map(|event| pipeline.handle_event(event))
        .filter(|applied| *applied)
        .count();
    assert_eq!(applied, 9);
    assert_eq!(pipeline.stats().snapshot().flex_readings, 9);

    for id in ids {
        let sensor = pipeline.flex_sensor(id).unwrap();
        assert_eq!(sensor.last_raw_value(), 200.0);
        assert_eq!(sensor.min_observed(), Some(100.0));
        assert_eq!(sensor.max_observed(), Some(300.0));
    }
}

#[test]
fn test_angle_and_reading_events_share_a_feed() {
    let mut pipeline = InputPipeline::default();
    let finger = pipeline.register_flex_tracker(
        Tracker::new("glove-l-little-1", Some(TrackerRole::LeftLittleProximal))
            .with_rotation_capability(),
    );
    let shoulder = pipeline.register_flex_tracker(
        Tracker::new("shoulder-r", Some(TrackerRole::RightShoulder)).with_rotation_capability(),
    );

    let feed = SensorFeed::new(8);
    let sender = feed.sender();
    sender.send(SensorEvent::flex_reading(finger, 10.0)).unwrap();
    sender.send(SensorEvent::flex_angle(shoulder, 0.4)).unwrap();
    sender.send(SensorEvent::flex_angle(finger, 0.2)).unwrap();

    for event in feed.drain() {
        assert!(pipeline.handle_event(event));
    }

    let snapshot = pipeline.stats().snapshot();
    assert_eq!(snapshot.flex_readings, 1);
    assert_eq!(snapshot.flex_angles, 2);

    // Right shoulder bends about +Z
    let (axis, angle) = pipeline
        .registry()
        .get(shoulder)
        .unwrap()
        .rotation
        .axis_angle()
        .unwrap();
    assert!((angle - 0.4).abs() < 1e-5);
    assert!((axis.z - 1.0).abs() < 1e-5);

    let sensor = pipeline.flex_sensor(finger).unwrap();
    assert!((sensor.last_angle() - 0.2).abs() < 1e-5);
    assert_eq!(sensor.last_raw_value(), 10.0);
}
