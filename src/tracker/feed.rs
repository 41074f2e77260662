//! Sensor event feed.
//!
//! Raw flex readings and calibration commands arrive from the transport on
//! whatever thread delivers them. The feed is a bounded queue that hands
//! them to the single thread owning the pipeline.

use crate::tracker::types::TrackerId;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Default queue capacity.
pub const DEFAULT_FEED_CAPACITY: usize = 10_000;

/// A message from the sensor transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    /// Raw resistance reading for the flex sensor on a tracker
    FlexReading {
        tracker: TrackerId,
        value: f32,
        timestamp: DateTime<Utc>,
    },
    /// Bend angle in radians from a sensor that reports angles directly
    FlexAngle {
        tracker: TrackerId,
        angle: f32,
        timestamp: DateTime<Utc>,
    },
    /// Snap the lower calibration bound to the last reading
    ResetFlexMin { tracker: TrackerId },
    /// Snap the upper calibration bound to the last reading
    ResetFlexMax { tracker: TrackerId },
}

impl SensorEvent {
    /// Build a reading event stamped with the current time.
    pub fn flex_reading(tracker: TrackerId, value: f32) -> Self {
        SensorEvent::FlexReading {
            tracker,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Build an angle event stamped with the current time.
    pub fn flex_angle(tracker: TrackerId, angle: f32) -> Self {
        SensorEvent::FlexAngle {
            tracker,
            angle,
            timestamp: Utc::now(),
        }
    }

    /// Tracker the event is addressed to.
    pub fn tracker(&self) -> TrackerId {
        match self {
            SensorEvent::FlexReading { tracker, .. }
            | SensorEvent::FlexAngle { tracker, .. }
            | SensorEvent::ResetFlexMin { tracker }
            | SensorEvent::ResetFlexMax { tracker } => *tracker,
        }
    }
}

/// Errors from pushing into the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("sensor feed is full")]
    Full,
    #[error("sensor feed is closed")]
    Closed,
}

/// Cloneable producer handle for the transport side.
#[derive(Debug, Clone)]
pub struct FeedSender {
    sender: Sender<SensorEvent>,
}

impl FeedSender {
    /// Push an event, blocking while the queue is full.
    pub fn send(&self, event: SensorEvent) -> Result<(), FeedError> {
        self.sender.send(event).map_err(|_| FeedError::Closed)
    }

    /// Push an event without blocking.
    pub fn try_send(&self, event: SensorEvent) -> Result<(), FeedError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => FeedError::Full,
            TrySendError::Disconnected(_) => FeedError::Closed,
        })
    }
}

/// Bounded queue between the sensor transport and the pipeline.
pub struct SensorFeed {
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
}

impl SensorFeed {
    /// Create a feed holding at most `capacity` queued events.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Get a producer handle.
    pub fn sender(&self) -> FeedSender {
        FeedSender {
            sender: self.sender.clone(),
        }
    }

    /// Get the receiver for sensor events.
    pub fn receiver(&self) -> &Receiver<SensorEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<SensorEvent> {
        self.receiver.try_recv().ok()
    }

    /// Take every queued event.
    pub fn drain(&self) -> Vec<SensorEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for SensorFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
