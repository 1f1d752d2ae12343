use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::context::ProcessContext;
use crate::error::Result;
use crate::lifecycle::{LifeCycle, Stage, StageProcess, Tick};
use crate::scene::SceneReference;

use super::{Condition, Entity, EntityKind};

/// Condition-specific logic. Runtime state belongs in `#[serde(skip)]` fields.
pub trait ConditionLogic: Serialize + DeserializeOwned + Send + 'static {
    const TYPE_NAME: &'static str;

    /// Called when the condition starts activating; reset per-visit state here.
    fn on_activate(&mut self, _ctx: &mut ProcessContext) {}

    /// Polled once per tick while the condition is active and not yet completed.
    fn check(&mut self, ctx: &ProcessContext) -> bool;

    /// Put the scene into the state `check` waits for.
    fn autocomplete(&mut self, ctx: &mut ProcessContext);

    fn references(&self) -> Vec<SceneReference> {
        Vec::new()
    }
}

/// Wraps a `ConditionLogic` with the shared condition stage processes:
/// - Activating: reset, done immediately
/// - Active: poll `check()` each tick until it holds
/// - Active fast-forward: `autocomplete()` then observe through `check()`
pub struct ConditionEntity<C> {
    name: String,
    life_cycle: LifeCycle,
    completed: bool,
    autocomplete_failed: bool,
    logic: C,
}

impl<C: ConditionLogic> ConditionEntity<C> {
    pub fn new(name: impl Into<String>, logic: C) -> Self {
        Self {
            name: name.into(),
            life_cycle: LifeCycle::new(),
            completed: false,
            autocomplete_failed: false,
            logic,
        }
    }

    pub fn logic(&self) -> &C {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut C {
        &mut self.logic
    }
}

impl<C: ConditionLogic> StageProcess for ConditionEntity<C> {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            self.completed = false;
            self.autocomplete_failed = false;
            self.logic.on_activate(ctx);
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        if stage != Stage::Active || self.completed {
            return Tick::Done;
        }
        if self.logic.check(ctx) {
            self.completed = true;
            return Tick::Done;
        }
        Tick::Pending
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage != Stage::Active || self.completed {
            return;
        }
        self.logic.autocomplete(ctx);
        if self.logic.check(ctx) {
            self.completed = true;
        } else if !self.autocomplete_failed {
            self.autocomplete_failed = true;
            warn!(
                condition = C::TYPE_NAME,
                name = %self.name,
                "autocomplete did not satisfy the condition"
            );
        }
    }
}

impl<C: ConditionLogic> Entity for ConditionEntity<C> {
    fn kind(&self) -> EntityKind {
        EntityKind::Condition
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn life_cycle(&self) -> &LifeCycle {
        &self.life_cycle
    }

    fn life_cycle_mut(&mut self) -> &mut LifeCycle {
        &mut self.life_cycle
    }
}

impl<C: ConditionLogic> Condition for ConditionEntity<C> {
    fn type_name(&self) -> &'static str {
        C::TYPE_NAME
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        self.logic.autocomplete(ctx);
    }

    fn references(&self) -> Vec<SceneReference> {
        self.logic.references()
    }

    fn to_data(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.logic)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
