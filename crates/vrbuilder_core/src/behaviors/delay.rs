use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::BehaviorLogic;
use crate::lifecycle::{Stage, StageProcess, Tick};

fn blocking() -> bool {
    true
}

/// Waits `delay_seconds` of simulated time while activating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayBehavior {
    pub delay_seconds: f32,
    #[serde(default = "blocking")]
    pub is_blocking: bool,
    #[serde(skip)]
    deadline: Option<Duration>,
}

impl DelayBehavior {
    pub fn new(delay_seconds: f32) -> Self {
        Self {
            delay_seconds,
            is_blocking: true,
            deadline: None,
        }
    }

    pub fn non_blocking(mut self) -> Self {
        self.is_blocking = false;
        self
    }
}

impl StageProcess for DelayBehavior {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            let delay = Duration::try_from_secs_f32(self.delay_seconds).unwrap_or_default();
            self.deadline = Some(ctx.now() + delay);
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        match (stage, self.deadline) {
            (Stage::Activating, Some(deadline)) if ctx.now() < deadline => Tick::Pending,
            _ => Tick::Done,
        }
    }

    fn on_end(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            self.deadline = None;
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            self.deadline = None;
        }
    }
}

impl BehaviorLogic for DelayBehavior {
    const TYPE_NAME: &'static str = "delay";

    fn is_blocking(&self) -> bool {
        self.is_blocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BehaviorEntity, Entity};
    use crate::lifecycle;

    #[test]
    fn activates_after_delay() {
        let mut ctx = ProcessContext::default();
        let mut delay = BehaviorEntity::new("delay", DelayBehavior::new(0.5));
        lifecycle::activate(&mut delay, &mut ctx).unwrap();

        ctx.advance(Duration::from_millis(300));
        lifecycle::update(&mut delay, &mut ctx);
        assert_eq!(delay.stage(), Stage::Activating);

        ctx.advance(Duration::from_millis(300));
        lifecycle::update(&mut delay, &mut ctx);
        assert_eq!(delay.stage(), Stage::Active);
    }

    #[test]
    fn fast_forward_skips_the_wait() {
        let mut ctx = ProcessContext::default();
        let mut delay = BehaviorEntity::new("delay", DelayBehavior::new(60.0));
        lifecycle::activate(&mut delay, &mut ctx).unwrap();
        lifecycle::mark_to_fast_forward(&mut delay, &mut ctx);
        assert_eq!(delay.stage(), Stage::Active);
    }
}
