//! Per-run state threaded through every tick.
//!
//! Everything an entity may consult or change outside its own subtree lives here:
//! simulated time, the scene, the active mode and the stage event buffer.

use std::collections::VecDeque;
use std::time::Duration;

use crate::lifecycle::StageEvent;
use crate::mode::Mode;
use crate::scene::SceneObjectRegistry;

/// Upper bound on buffered stage events; the oldest are dropped first.
pub const MAX_BUFFERED_EVENTS: usize = 4096;

/// Simulated time of a process run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    elapsed: Duration,
    delta: Duration,
}

impl Clock {
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    /// Length of the last tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
    }
}

#[derive(Default)]
pub struct ProcessContext {
    clock: Clock,
    scene: SceneObjectRegistry,
    mode: Mode,
    events: VecDeque<StageEvent>,
    dropped_events: u64,
}

impl ProcessContext {
    pub fn new(scene: SceneObjectRegistry) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Elapsed simulated time since the run started.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.clock.advance(delta);
    }

    pub fn scene(&self) -> &SceneObjectRegistry {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneObjectRegistry {
        &mut self.scene
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub(crate) fn record_event(&mut self, event: StageEvent) {
        if self.events.len() == MAX_BUFFERED_EVENTS {
            self.events.pop_front();
            self.dropped_events += 1;
        }
        self.events.push_back(event);
    }

    /// Take every buffered stage event, oldest first.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        self.events.drain(..).collect()
    }

    /// Events lost because nobody drained the buffer in time.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }
}
