use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ProcessContext;
use crate::error::Result;
use crate::lifecycle::{LifeCycle, Stage, StageProcess, Tick};

use super::{Behavior, Entity, EntityKind};

/// Behavior-specific stage work. Runtime state belongs in `#[serde(skip)]` fields.
pub trait BehaviorLogic: StageProcess + Serialize + DeserializeOwned + Send + 'static {
    const TYPE_NAME: &'static str;

    fn is_blocking(&self) -> bool {
        true
    }
}

/// Gives a `BehaviorLogic` a name and a life cycle.
pub struct BehaviorEntity<B> {
    name: String,
    life_cycle: LifeCycle,
    logic: B,
}

impl<B: BehaviorLogic> BehaviorEntity<B> {
    pub fn new(name: impl Into<String>, logic: B) -> Self {
        Self {
            name: name.into(),
            life_cycle: LifeCycle::new(),
            logic,
        }
    }

    pub fn logic(&self) -> &B {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut B {
        &mut self.logic
    }
}

impl<B: BehaviorLogic> StageProcess for BehaviorEntity<B> {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        self.logic.on_start(stage, ctx);
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        self.logic.on_update(stage, ctx)
    }

    fn on_end(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        self.logic.on_end(stage, ctx);
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        self.logic.on_fast_forward(stage, ctx);
    }
}

impl<B: BehaviorLogic> Entity for BehaviorEntity<B> {
    fn kind(&self) -> EntityKind {
        EntityKind::Behavior
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

impl<B: BehaviorLogic> Behavior for BehaviorEntity<B> {
    fn type_name(&self) -> &'static str {
        B::TYPE_NAME
    }

    fn is_blocking(&self) -> bool {
        self.logic.is_blocking()
    }

    fn to_data(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.logic)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
