use super::Stage;

/// Per-entity life cycle bookkeeping.
///
/// Only the engine functions in this module mutate it; entities expose it so the
/// engine can drive them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LifeCycle {
    stage: Stage,
    process_running: bool,
    fast_forward: u8,
}

impl LifeCycle {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Inactive,
            process_running: false,
            fast_forward: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// True while the current stage's process has not finished yet.
    ///
    /// An Active entity whose process finished stays Active (its rest stage).
    pub fn is_process_running(&self) -> bool {
        self.process_running
    }

    pub fn is_marked_to_fast_forward(&self, stage: Stage) -> bool {
        self.fast_forward & stage.bit() != 0
    }

    pub(crate) fn mark(&mut self, stage: Stage) {
        self.fast_forward |= stage.bit();
    }

    pub(crate) fn set_process_running(&mut self, running: bool) {
        self.process_running = running;
    }

    /// Switch stage; returns the previous one. Reaching Inactive drops pending
    /// fast-forward requests so the next activation starts clean.
    pub(crate) fn enter(&mut self, stage: Stage) -> Stage {
        let from = self.stage;
        self.stage = stage;
        self.process_running = stage != Stage::Inactive;
        if stage == Stage::Inactive {
            self.fast_forward = 0;
        }
        from
    }
}

impl Default for LifeCycle {
    fn default() -> Self {
        Self::new()
    }
}
