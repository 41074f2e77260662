//! Registry of live trackers.

use crate::tracker::types::{Tracker, TrackerId};

/// Ordered set of currently registered trackers.
///
/// Registration order is preserved and is the order consumers scan in.
#[derive(Debug, Default)]
pub struct TrackerRegistry {
    trackers: Vec<Tracker>,
}

impl TrackerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tracker and return its id.
    ///
    /// Registering an id that is already present replaces that entry in place.
    pub fn register(&mut self, tracker: Tracker) -> TrackerId {
        let id = tracker.id();
        match self.trackers.iter_mut().find(|t| t.id() == id) {
            Some(existing) => *existing = tracker,
            None => self.trackers.push(tracker),
        }
        id
    }

    /// Tracker with the given id.
    pub fn get(&self, id: TrackerId) -> Option<&Tracker> {
        self.trackers.iter().find(|t| t.id() == id)
    }

    /// Mutable tracker with the given id.
    pub fn get_mut(&mut self, id: TrackerId) -> Option<&mut Tracker> {
        self.trackers.iter_mut().find(|t| t.id() == id)
    }

    /// First tracker registered under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Tracker> {
        self.trackers.iter().find(|t| t.name == name)
    }

    /// Snapshot of all registered trackers, in registration order.
    pub fn all_trackers(&self) -> &[Tracker] {
        &self.trackers
    }

    /// Number of registered trackers.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}
