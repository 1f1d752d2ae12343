use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;

/// Completes once `timeout` seconds of simulated time passed since activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutCondition {
    pub timeout: f32,
    #[serde(skip)]
    deadline: Option<Duration>,
}

impl TimeoutCondition {
    pub fn new(timeout: f32) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }
}

impl ConditionLogic for TimeoutCondition {
    const TYPE_NAME: &'static str = "timeout";

    fn on_activate(&mut self, ctx: &mut ProcessContext) {
        let timeout = Duration::try_from_secs_f32(self.timeout).unwrap_or_default();
        self.deadline = Some(ctx.now() + timeout);
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        self.deadline.is_some_and(|deadline| ctx.now() >= deadline)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        self.deadline = Some(ctx.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_simulated_time() {
        let mut ctx = ProcessContext::default();
        let mut timeout = TimeoutCondition::new(1.0);
        timeout.on_activate(&mut ctx);

        ctx.advance(Duration::from_millis(600));
        assert!(!timeout.check(&ctx));
        ctx.advance(Duration::from_millis(400));
        assert!(timeout.check(&ctx));
    }

    #[test]
    fn negative_timeout_completes_immediately() {
        let mut ctx = ProcessContext::default();
        let mut timeout = TimeoutCondition::new(-3.0);
        timeout.on_activate(&mut ctx);
        assert!(timeout.check(&ctx));
    }
}
