#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vrbuilder_core::context::ProcessContext;
use vrbuilder_core::entity::{BehaviorLogic, ConditionEntity, ConditionLogic, Entity};
use vrbuilder_core::lifecycle::{self, Stage, StageProcess, Tick};

pub const TICK: Duration = Duration::from_millis(100);

/// Condition completed from the outside: `fire()` makes the next check succeed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TriggerCondition {
    #[serde(skip)]
    trigger: Arc<AtomicBool>,
}

impl TriggerCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Trigger {
        Trigger(self.trigger.clone())
    }
}

#[derive(Clone)]
pub struct Trigger(Arc<AtomicBool>);

impl Trigger {
    pub fn fire(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ConditionLogic for TriggerCondition {
    const TYPE_NAME: &'static str = "trigger";

    fn check(&mut self, _ctx: &ProcessContext) -> bool {
        self.trigger.swap(false, Ordering::SeqCst)
    }

    fn autocomplete(&mut self, _ctx: &mut ProcessContext) {
        self.trigger.store(true, Ordering::SeqCst);
    }
}

pub fn trigger(name: &str) -> (ConditionEntity<TriggerCondition>, Trigger) {
    let condition = TriggerCondition::new();
    let handle = condition.handle();
    (ConditionEntity::new(name, condition), handle)
}

/// Behavior that never finishes activating unless fast-forwarded.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EndlessBehaviorMock {
    #[serde(skip)]
    skipped: bool,
}

impl StageProcess for EndlessBehaviorMock {
    fn on_start(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            self.skipped = false;
        }
    }

    fn on_update(&mut self, stage: Stage, _ctx: &mut ProcessContext) -> Tick {
        if stage == Stage::Activating && !self.skipped {
            Tick::Pending
        } else {
            Tick::Done
        }
    }

    fn on_fast_forward(&mut self, _stage: Stage, _ctx: &mut ProcessContext) {
        self.skipped = true;
    }
}

impl BehaviorLogic for EndlessBehaviorMock {
    const TYPE_NAME: &'static str = "endless_mock";
}

/// Advance the clock by one tick and update `entity`.
pub fn tick<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) {
    ctx.advance(TICK);
    lifecycle::update(entity, ctx);
}

/// Tick until `done` holds; returns the number of ticks used.
pub fn tick_until<E: Entity + ?Sized>(
    entity: &mut E,
    ctx: &mut ProcessContext,
    max_ticks: usize,
    done: impl Fn(&E) -> bool,
) -> usize {
    for n in 0..max_ticks {
        if done(entity) {
            return n;
        }
        tick(entity, ctx);
    }
    assert!(done(entity), "condition not reached within {max_ticks} ticks");
    max_ticks
}
