//! Entity tree of a process.
//!
//! Ownership is strictly a tree: process -> chapters -> steps -> transitions and
//! behaviors -> conditions. Transition targets are `StepId`s resolved through the
//! owning chapter, never owning pointers, so control flow may loop while ownership
//! stays acyclic.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::error::Result;
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess};
use crate::scene::SceneReference;

mod behavior;
mod chapter;
mod condition;
mod process;
mod step;
mod transition;

pub use behavior::{BehaviorEntity, BehaviorLogic};
pub use chapter::Chapter;
pub use condition::{ConditionEntity, ConditionLogic};
pub use process::Process;
pub use step::Step;
pub use transition::Transition;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Process,
    Chapter,
    Step,
    Transition,
    Condition,
    Behavior,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Process => "process",
            EntityKind::Chapter => "chapter",
            EntityKind::Step => "step",
            EntityKind::Transition => "transition",
            EntityKind::Condition => "condition",
            EntityKind::Behavior => "behavior",
        }
    }
}

/// A unit participating in the stage model.
///
/// `update_children` is called after the entity's own stage process on every tick,
/// whatever the entity's stage.
pub trait Entity: StageProcess {
    fn kind(&self) -> EntityKind;
    fn name(&self) -> &str;
    fn life_cycle(&self) -> &LifeCycle;
    fn life_cycle_mut(&mut self) -> &mut LifeCycle;

    fn update_children(&mut self, _ctx: &mut ProcessContext) {}

    fn stage(&self) -> Stage {
        self.life_cycle().stage()
    }
}

/// Leaf completable polled while its transition is evaluated.
pub trait Condition: Entity + Send {
    fn type_name(&self) -> &'static str;
    fn is_completed(&self) -> bool;
    /// Drive the scene into the state this condition waits for. Completion is still
    /// only recorded once the condition's own check observes it.
    fn autocomplete(&mut self, ctx: &mut ProcessContext);
    /// Scene objects the condition needs to interact with.
    fn references(&self) -> Vec<SceneReference>;
    fn to_data(&self) -> Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
}

/// Work executed alongside a step.
pub trait Behavior: Entity + Send {
    fn type_name(&self) -> &'static str;
    /// Blocking behaviors hold the step in Activating until they are Active.
    fn is_blocking(&self) -> bool {
        true
    }
    fn to_data(&self) -> Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub Uuid);

impl StepId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub Uuid);

impl ChapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------- Child driving helpers ----------------

/// Activate a child, fast-forwarding it first when the active mode excludes its type.
pub(crate) fn activate_child<E: Entity + ?Sized>(
    child: &mut E,
    type_name: Option<&str>,
    ctx: &mut ProcessContext,
) {
    if let Some(type_name) = type_name {
        if !ctx.mode().allows(type_name) {
            lifecycle::mark_to_fast_forward(child, ctx);
        }
    }
    if let Err(err) = lifecycle::activate(child, ctx) {
        warn!(kind = child.kind().label(), name = child.name(), "{err}");
    }
}

/// Move a child towards Inactive. A child still activating is fast-forwarded
/// through activation first. Safe to call on every tick.
pub(crate) fn request_deactivation<E: Entity + ?Sized>(child: &mut E, ctx: &mut ProcessContext) {
    if child.stage() == Stage::Activating {
        lifecycle::mark_to_fast_forward_stage(child, Stage::Activating, ctx);
    }
    if child.stage() == Stage::Active {
        if let Err(err) = lifecycle::deactivate(child, ctx) {
            warn!(kind = child.kind().label(), name = child.name(), "{err}");
        }
    }
}

pub(crate) fn abort_child<E: Entity + ?Sized>(child: &mut E, ctx: &mut ProcessContext) {
    if child.stage() == Stage::Inactive {
        return;
    }
    if let Err(err) = lifecycle::abort(child, ctx) {
        warn!(kind = child.kind().label(), name = child.name(), "{err}");
    }
}
