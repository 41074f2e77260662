//! Tracker Fusion CLI
//!
//! Drives the tracker input pipeline against a simulated rig, and inspects
//! saved pose recordings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use nalgebra::Vector3;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracker_fusion::{
    config::Config,
    core::{max_angle_for_role, AnglePolicy, FlexAxis, InputPipeline},
    recording::{PoseRecording, StreamSummary},
    stats::create_shared_stats_with_persistence,
    tracker::{FeedError, FeedSender, SensorEvent, SensorFeed, Tracker, TrackerId, TrackerRole},
    VERSION,
};

#[derive(Parser)]
#[command(name = "tracker-fusion")]
#[command(version = VERSION)]
#[command(about = "Tracker input fusion for full-body motion tracking", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against a simulated glove and controller rig
    Simulate {
        /// Stop after this many ticks (runs until Ctrl+C otherwise)
        #[arg(long)]
        ticks: Option<u64>,

        /// Record the session and save it on exit
        #[arg(long)]
        record: bool,

        /// Name of the recording
        #[arg(long, default_value = "simulation")]
        name: String,

        /// Clamp flex angles into each joint's range
        #[arg(long)]
        clamp: bool,

        /// Enable hand source substitution for this run
        #[arg(long)]
        hands: bool,
    },

    /// Summarize a saved recording
    Inspect {
        /// Recording file
        file: PathBuf,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the flex angle range and axis for every role
    Roles {
        /// Only show this role (e.g. `left_index_proximal`)
        role: Option<TrackerRole>,
    },

    /// Show cumulative pipeline statistics
    Status,

    /// Show configuration
    Config,

    /// Permanently enable hand source substitution
    EnableHands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            ticks,
            record,
            name,
            clamp,
            hands,
        } => cmd_simulate(ticks, record, &name, clamp, hands),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Roles { role } => {
            cmd_roles(role);
            Ok(())
        }
        Commands::Status => {
            cmd_status();
            Ok(())
        }
        Commands::Config => cmd_config(),
        Commands::EnableHands => cmd_enable_hands(),
    }
}

/// Trackers making up the simulated rig.
struct Rig {
    left_controller: TrackerId,
    right_controller: TrackerId,
    left_hand: TrackerId,
    right_hand: TrackerId,
    flex: Vec<TrackerId>,
    shoulders: Vec<TrackerId>,
}

impl Rig {
    // Controllers are registered before hand tracking so hand tracking can
    // take over once a controller is live.
    fn build(pipeline: &mut InputPipeline) -> Self {
        let tracked = |name: &str, role: TrackerRole| {
            Tracker::new(name, Some(role))
                .with_position_capability()
                .with_rotation_capability()
        };

        let left_controller =
            pipeline.register_tracker(tracked("controller-left", TrackerRole::LeftController));
        let right_controller =
            pipeline.register_tracker(tracked("controller-right", TrackerRole::RightController));
        let left_hand = pipeline.register_tracker(tracked("hand-left", TrackerRole::LeftHand));
        let right_hand = pipeline.register_tracker(tracked("hand-right", TrackerRole::RightHand));

        let flex = TrackerRole::ALL
            .iter()
            .copied()
            .filter(|role| role.is_finger())
            .map(|role| {
                pipeline.register_flex_tracker(
                    Tracker::new(format!("glove-{role}"), Some(role)).with_rotation_capability(),
                )
            })
            .collect();

        // Shoulder sensors report angles directly
        let shoulders = [TrackerRole::LeftShoulder, TrackerRole::RightShoulder]
            .into_iter()
            .map(|role| {
                pipeline.register_flex_tracker(
                    Tracker::new(format!("shoulder-{role}"), Some(role)).with_rotation_capability(),
                )
            })
            .collect();

        Self {
            left_controller,
            right_controller,
            left_hand,
            right_hand,
            flex,
            shoulders,
        }
    }

    /// Move controllers and hands along a slow arc; hand tracking drops out
    /// (reports the origin) for part of every cycle.
    fn animate(&self, pipeline: &mut InputPipeline, tick: u64) {
        let t = tick as f32 * 0.01;
        let hands_visible = (tick / 200) % 3 != 2;

        let poses = [
            (self.left_controller, Vector3::new(-0.3 + 0.1 * t.sin(), 1.1, 0.3), true),
            (self.right_controller, Vector3::new(0.3 + 0.1 * t.cos(), 1.1, 0.3), true),
            (self.left_hand, Vector3::new(-0.3, 1.1 + 0.05 * t.sin(), 0.35), hands_visible),
            (self.right_hand, Vector3::new(0.3, 1.1 + 0.05 * t.cos(), 0.35), hands_visible),
        ];

        let registry = pipeline.registry_mut();
        for (id, position, visible) in poses {
            if let Some(tracker) = registry.get_mut(id) {
                tracker.set_position(if visible { position } else { Vector3::zeros() });
                tracker.data_tick();
            }
        }
    }
}

fn cmd_simulate(
    ticks: Option<u64>,
    record: bool,
    name: &str,
    clamp: bool,
    hands: bool,
) -> anyhow::Result<()> {
    println!("Tracker Fusion v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {e}");
        Config::default()
    });
    if clamp {
        config.flex.angle_policy = AnglePolicy::Clamped;
    }
    if hands {
        config.hand_source_substitution = true;
    }
    if let Err(e) = config.ensure_directories() {
        warn!("Could not create directories: {e}");
    }

    let stats = create_shared_stats_with_persistence(config.stats_path());
    let mut pipeline = InputPipeline::from_config(&config, stats.clone());
    let rig = Rig::build(&mut pipeline);

    println!("Simulating rig...");
    println!("  Flex sensors: {}", rig.flex.len());
    println!("  Angle sensors: {}", rig.shoulders.len());
    println!("  Tick interval: {}ms", config.tick_interval.as_millis());
    println!("  Angle policy: {:?}", config.flex.angle_policy);
    println!(
        "  Hand source substitution: {}",
        if pipeline.arbiter().is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    if record {
        pipeline.start_recording(name);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    let feed = SensorFeed::default();
    let producer = spawn_glove(
        feed.sender(),
        rig.flex.clone(),
        rig.shoulders.clone(),
        config.tick_interval,
        running.clone(),
    );

    let receiver = feed.receiver().clone();
    let mut tick = 0u64;
    let mut last_tick = Instant::now();

    while running.load(Ordering::SeqCst) && ticks.map_or(true, |limit| tick < limit) {
        match receiver.recv_timeout(config.tick_interval) {
            Ok(event) => {
                pipeline.handle_event(event);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Sensor feed disconnected unexpectedly");
                break;
            }
        }

        if last_tick.elapsed() >= config.tick_interval {
            rig.animate(&mut pipeline, tick);
            pipeline.tick();
            tick += 1;
            last_tick = Instant::now();

            if tick % 500 == 0 {
                let skeleton = pipeline.skeleton();
                info!(
                    tick,
                    left = ?skeleton.computed_left_hand,
                    right = ?skeleton.computed_right_hand,
                    "Pipeline running"
                );
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    if producer.join().is_err() {
        warn!("Glove producer thread panicked");
    }

    // Apply anything still queued before shutting down
    for event in feed.drain() {
        pipeline.handle_event(event);
    }

    println!();
    println!("Stopping after {tick} ticks...");

    let shape = pipeline
        .recording()
        .map(|recording| (recording.frame_count(), recording.streams().len()));
    if let Some(path) = pipeline
        .export_recording(&config)
        .context("exporting recording")?
    {
        let (frames, streams) = shape.unwrap_or_default();
        println!("Saved {frames} frames across {streams} streams to {path:?}");
    }

    if let Err(e) = stats.save() {
        warn!("Could not save pipeline stats: {e}");
    }

    println!();
    println!("{}", stats.summary());
    Ok(())
}

/// Push an event without blocking. Returns `false` once the feed is closed.
fn push_event(sender: &FeedSender, event: SensorEvent) -> bool {
    let tracker = event.tracker();
    match sender.try_send(event) {
        Ok(()) => true,
        Err(FeedError::Full) => {
            warn!(%tracker, "Sensor feed full, event dropped");
            true
        }
        Err(FeedError::Closed) => false,
    }
}

/// Feed synthetic flex readings and shoulder angles until `running` is
/// cleared.
fn spawn_glove(
    sender: FeedSender,
    flex: Vec<TrackerId>,
    shoulders: Vec<TrackerId>,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let started = Instant::now();
        let mut sent_reset = false;

        while running.load(Ordering::SeqCst) {
            let t = started.elapsed().as_secs_f32();
            for (i, id) in flex.iter().enumerate() {
                let phase = i as f32 * 0.35;
                let value = 1000.0 + 400.0 * (t * 1.5 + phase).sin();
                if !push_event(&sender, SensorEvent::flex_reading(*id, value)) {
                    return;
                }
            }

            let shoulder_angle = 0.3 * (1.0 + (t * 0.5).sin());
            for id in &shoulders {
                if !push_event(&sender, SensorEvent::flex_angle(*id, shoulder_angle)) {
                    return;
                }
            }

            // Recalibrate the straight position once the glove has moved a bit
            if !sent_reset && t > 2.0 {
                for id in &flex {
                    if !push_event(&sender, SensorEvent::ResetFlexMin { tracker: *id }) {
                        return;
                    }
                }
                sent_reset = true;
            }

            thread::sleep(interval);
        }
    })
}

fn cmd_inspect(file: &Path, json: bool) -> anyhow::Result<()> {
    let recording = PoseRecording::load(file)
        .with_context(|| format!("loading recording from {}", file.display()))?;
    let summaries: Vec<StreamSummary> = recording
        .streams()
        .iter()
        .map(StreamSummary::from_history)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let metadata = &recording.metadata;
    println!("Recording: {}", metadata.name);
    println!("  Id: {}", metadata.id);
    println!("  Started: {}", metadata.started_at.to_rfc3339());
    if let Some(ended) = metadata.ended_at {
        println!("  Ended: {}", ended.to_rfc3339());
    }
    println!("  Format version: {}", metadata.format_version);
    println!("  Frames: {}", recording.frame_count());
    println!();

    println!(
        "{:<32} {:<26} {:>7} {:>7} {:>10} {:>10}",
        "stream", "role", "frames", "dropped", "mean°", "stddev°"
    );
    for summary in &summaries {
        println!(
            "{:<32} {:<26} {:>7} {:>7} {:>10} {:>10}",
            summary.name,
            summary.role.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            summary.total_frames,
            summary.dropped_frames,
            format_degrees(summary.mean_rotation_deg),
            format_degrees(summary.rotation_std_dev_deg),
        );
    }

    println!();
    println!("Materialized trackers:");
    for tracker in recording.materialize_trackers() {
        println!(
            "  {} {} (position: {}, rotation: {}, acceleration: {})",
            tracker.id(),
            tracker.name,
            tracker.has_position,
            tracker.has_rotation,
            tracker.has_acceleration
        );
    }

    Ok(())
}

fn format_degrees(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

fn cmd_roles(filter: Option<TrackerRole>) {
    println!("{:<26} {:>10} {:>10}", "role", "max angle", "axis");

    let roles: Vec<TrackerRole> = match filter {
        Some(role) => vec![role],
        None => TrackerRole::ALL.to_vec(),
    };
    for role in roles {
        print_role_row(role.as_str(), Some(role));
    }
    if filter.is_none() {
        print_role_row("(none)", None);
    }
}

fn print_role_row(label: &str, role: Option<TrackerRole>) {
    println!(
        "{:<26} {:>9.0}° {:>10}",
        label,
        max_angle_for_role(role).to_degrees(),
        axis_name(FlexAxis::for_role(role))
    );
}

fn axis_name(axis: FlexAxis) -> &'static str {
    match axis {
        FlexAxis::PositiveZ => "+z",
        FlexAxis::NegativeZ => "-z",
        FlexAxis::PitchX => "x",
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Tracker Fusion Status");
    println!("=====================");
    println!();
    println!("Configuration:");
    println!(
        "  Hand source substitution: {}",
        if config.hand_source_substitution {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Angle policy: {:?}", config.flex.angle_policy);
    println!("  Tick interval: {}ms", config.tick_interval.as_millis());
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        let stats = create_shared_stats_with_persistence(stats_path);
        let snapshot = stats.snapshot();
        println!("Cumulative Statistics:");
        println!("  Flex readings: {}", snapshot.flex_readings);
        println!("  Flex angles: {}", snapshot.flex_angles);
        println!("  Calibration resets: {}", snapshot.calibration_resets);
        println!("  Ignored events: {}", snapshot.ignored_events);
        println!("  Arbiter ticks: {}", snapshot.arbiter_ticks);
        println!("  Frames recorded: {}", snapshot.frames_recorded);
        println!("  Frames dropped: {}", snapshot.frames_dropped);
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().context("loading config")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

// Enabling is one-way, so there is no disable command.
fn cmd_enable_hands() -> anyhow::Result<()> {
    let mut config = Config::load().context("loading config")?;
    config.hand_source_substitution = true;
    config.save().context("saving config")?;
    println!("Hand source substitution enabled.");
    Ok(())
}
