use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Pause switch shared by a [`ProcessRunner`](super::ProcessRunner) and the loop
/// that ticks it. Simulated time only advances while the gate is running.
///
/// A new gate is paused; the runner resumes it once the process started.
#[derive(Debug)]
pub struct PauseGate {
    paused: AtomicBool,
    skipped: AtomicU64,
}

impl PauseGate {
    pub const fn new() -> Self {
        Self {
            paused: AtomicBool::new(true),
            skipped: AtomicU64::new(0),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        !self.paused.load(Ordering::Acquire)
    }

    /// Let one tick through. A tick offered while paused is counted and refused.
    pub fn admit_tick(&self) -> bool {
        if self.is_running() {
            return true;
        }
        self.skipped.fetch_add(1, Ordering::Relaxed);
        false
    }

    /// Ticks refused so far.
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_gate_refuses_and_counts_ticks() {
        let gate = PauseGate::new();
        assert!(!gate.is_running());
        assert!(!gate.admit_tick());
        assert!(!gate.admit_tick());

        gate.resume();
        assert!(gate.admit_tick());
        assert_eq!(gate.skipped_ticks(), 2);

        gate.pause();
        assert!(!gate.admit_tick());
        assert_eq!(gate.skipped_ticks(), 3);
    }
}
