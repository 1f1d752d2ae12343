use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{PauseGate, ProcessRunner};

/// A pause-gated periodic tick source.
///
/// The interval keeps running while the gate is paused; those ticks are skipped
/// and never handed to the tick body. Each executed tick advances the process
/// clock by exactly one period, so simulated time only moves while unpaused.
pub struct ManagedTicker {
    gate: Arc<PauseGate>,
    period: Duration,
}

impl ManagedTicker {
    /// `period` is clamped to at least one millisecond.
    pub fn new(gate: Arc<PauseGate>, period: Duration) -> Self {
        Self {
            gate,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Call `tick(period)` on every interval the gate admits, until it breaks.
    /// Returns the number of executed ticks.
    pub async fn run<F>(&self, mut tick: F) -> u64
    where
        F: FnMut(Duration) -> ControlFlow<()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut executed = 0;
        loop {
            interval.tick().await;

            if !self.gate.admit_tick() {
                continue;
            }
            executed += 1;
            if tick(self.period).is_break() {
                return executed;
            }
        }
    }

    /// Tick `runner` until its process finishes or `max_ticks` ticks ran.
    /// The runner must be started, otherwise its gate stays paused.
    pub async fn drive(&self, runner: &mut ProcessRunner, max_ticks: Option<u64>) -> u64 {
        let executed = self
            .run(|delta| {
                runner.tick(delta);
                let limit_hit = max_ticks.is_some_and(|max| runner.ticks() >= max);
                if runner.is_finished() || limit_hit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;
        debug!(executed, finished = runner.is_finished(), "ticker stopped");
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vrbuilder_core::conditions::TimeoutCondition;
    use vrbuilder_core::context::ProcessContext;
    use vrbuilder_core::entity::{Chapter, ConditionEntity, Process, Step, Transition};

    #[tokio::test]
    async fn ticker_skips_while_paused_and_runs_when_open() {
        let gate = Arc::new(PauseGate::new());
        let ticker = ManagedTicker::new(gate.clone(), Duration::from_millis(10));
        let hits = Arc::new(AtomicUsize::new(0));

        let hits2 = hits.clone();
        let handle = tokio::spawn(async move {
            ticker
                .run(|_| {
                    hits2.fetch_add(1, Ordering::Relaxed);
                    ControlFlow::Continue(())
                })
                .await
        });

        // Ticks while paused are dropped.
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(hits.load(Ordering::Relaxed), 0);

        assert!(gate.skipped_ticks() > 0);

        gate.resume();
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert!(hits.load(Ordering::Relaxed) > 0);

        // The loop only ends on Break.
        handle.abort();
    }

    #[tokio::test]
    async fn drive_runs_process_to_completion() {
        let timeout = ConditionEntity::new("timeout", TimeoutCondition::new(0.05));
        let step = Step::new("wait").with_transition(Transition::new().with_condition(timeout));
        let process = Process::new("short", Chapter::new("only").with_step(step));
        let mut runner = ProcessRunner::new(process, ProcessContext::default());
        runner.start().expect("start");

        let ticker = ManagedTicker::new(runner.pause_gate(), Duration::from_millis(5));
        let executed = ticker.drive(&mut runner, Some(200)).await;

        assert!(runner.is_finished());
        assert!(executed < 200);
        assert_eq!(runner.ticks(), executed);
    }

    #[tokio::test]
    async fn drive_stops_at_tick_limit() {
        let timeout = ConditionEntity::new("timeout", TimeoutCondition::new(60.0));
        let step = Step::new("wait").with_transition(Transition::new().with_condition(timeout));
        let process = Process::new("long", Chapter::new("only").with_step(step));
        let mut runner = ProcessRunner::new(process, ProcessContext::default());
        runner.start().expect("start");

        let ticker = ManagedTicker::new(runner.pause_gate(), Duration::from_millis(1));
        let executed = ticker.drive(&mut runner, Some(5)).await;

        assert_eq!(executed, 5);
        assert!(!runner.is_finished());
        assert_eq!(runner.context().now(), Duration::from_millis(5));
    }
}
