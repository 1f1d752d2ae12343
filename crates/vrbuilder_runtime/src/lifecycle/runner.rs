use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};
use vrbuilder_core::context::ProcessContext;
use vrbuilder_core::entity::{Entity, Process};
use vrbuilder_core::error::{CoreError, Domain, ErrorKind, Result};
use vrbuilder_core::lifecycle::{self, Stage};
use vrbuilder_core::mode::ModeHandler;

use super::{PauseGate, RunnerEvent};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Host-side owner of one running process.
///
/// Responsibilities:
/// - Hold the process and the context it is ticked with
/// - Skip ticks while the pause gate is closed
/// - Forward every stage change to subscribers
pub struct ProcessRunner {
    process: Process,
    ctx: ProcessContext,
    gate: Arc<PauseGate>,
    modes: ModeHandler,
    ticks: u64,
    reported_dropped: u64,
    reported_finished: bool,

    // broadcast so that a slow subscriber never stalls the tick loop;
    // lagging receivers lose old events instead.
    events: broadcast::Sender<RunnerEvent>,
}

impl ProcessRunner {
    /// Wrap `process`. The runner starts paused; `start()` resumes the gate.
    ///
    /// The mode already set on `ctx` becomes the only known mode.
    pub fn new(process: Process, ctx: ProcessContext) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let modes = ModeHandler::new(vec![ctx.mode().clone()]);
        Self {
            process,
            ctx,
            gate: Arc::new(PauseGate::new()),
            modes,
            ticks: 0,
            reported_dropped: 0,
            reported_finished: false,
            events,
        }
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    pub fn context(&self) -> &ProcessContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ProcessContext {
        &mut self.ctx
    }

    pub fn stage(&self) -> Stage {
        self.process.stage()
    }

    /// Ticks executed so far (skipped ticks excluded).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Shared pause gate for whatever drives the ticks.
    pub fn pause_gate(&self) -> Arc<PauseGate> {
        Arc::clone(&self.gate)
    }

    pub fn subscribe_stage_events(&self) -> broadcast::Receiver<RunnerEvent> {
        self.events.subscribe()
    }

    pub fn is_paused(&self) -> bool {
        !self.gate.is_running()
    }

    pub fn pause(&self) {
        info!(process = self.process.name(), ticks = self.ticks, "paused");
        self.gate.pause();
    }

    pub fn resume(&self) {
        info!(process = self.process.name(), ticks = self.ticks, "resumed");
        self.gate.resume();
    }

    /// The process ran through its last chapter.
    pub fn is_finished(&self) -> bool {
        self.process.is_finished()
    }

    pub fn modes(&self) -> &ModeHandler {
        &self.modes
    }

    /// Replace the known modes and switch to the handler's current mode.
    pub fn set_modes(&mut self, modes: ModeHandler) {
        self.modes = modes;
        self.apply_mode();
    }

    /// Switch to a known mode by name. Only entities activated from now on see it.
    pub fn select_mode(&mut self, name: &str) -> Result<()> {
        self.modes.select(name)?;
        self.apply_mode();
        Ok(())
    }

    fn apply_mode(&mut self) {
        let mode = self.modes.current().clone();
        info!(process = self.process.name(), mode = %mode.name, "mode changed");
        self.ctx.set_mode(mode);
    }

    /// Request activation of the process and resume the gate.
    pub fn start(&mut self) -> Result<()> {
        lifecycle::activate(&mut self.process, &mut self.ctx)?;
        self.reported_finished = false;
        self.gate.resume();
        info!(process = self.process.name(), "process started");
        self.publish();
        Ok(())
    }

    /// Advance the clock by `delta` and update the process once.
    ///
    /// Returns `false` without touching the process while paused.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.gate.admit_tick() {
            return false;
        }

        self.ctx.advance(delta);
        lifecycle::update(&mut self.process, &mut self.ctx);
        self.ticks += 1;
        self.publish();
        true
    }

    /// Fast-forward the whole process to its end.
    pub fn fast_forward(&mut self) {
        lifecycle::mark_to_fast_forward(&mut self.process, &mut self.ctx);
        self.publish();
    }

    /// Fast-forward only the step currently running.
    pub fn fast_forward_step(&mut self) -> Result<()> {
        let step = self
            .process
            .current_chapter_mut()
            .and_then(|chapter| chapter.current_step_mut())
            .ok_or_else(|| {
                CoreError::warn()
                    .domain(Domain::Process)
                    .kind(ErrorKind::InvalidState)
                    .msg("no step is running")
                    .build()
            })?;
        lifecycle::mark_to_fast_forward(step, &mut self.ctx);
        self.publish();
        Ok(())
    }

    pub fn abort(&mut self) -> Result<()> {
        lifecycle::abort(&mut self.process, &mut self.ctx)?;
        info!(process = self.process.name(), "process aborted");
        self.publish();
        Ok(())
    }

    fn publish(&mut self) {
        let at = self.ctx.now();
        for event in self.ctx.drain_events() {
            // No receivers is fine; events are advisory.
            let _ = self.events.send(RunnerEvent::stamped(at, event));
        }

        let dropped = self.ctx.dropped_events();
        if dropped > self.reported_dropped {
            warn!(
                process = self.process.name(),
                dropped = dropped - self.reported_dropped,
                "stage events overflowed the context buffer"
            );
            self.reported_dropped = dropped;
        }

        if self.is_finished() && !self.reported_finished {
            self.reported_finished = true;
            info!(
                process = self.process.name(),
                elapsed_ms = at.as_millis() as u64,
                "process finished"
            );
        }
    }
}
