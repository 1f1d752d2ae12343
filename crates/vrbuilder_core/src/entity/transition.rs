use crate::context::ProcessContext;
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess, Tick};
use crate::scene::SceneReference;

use super::{
    abort_child, activate_child, request_deactivation, Condition, Entity, EntityKind, StepId,
};

/// Guarded edge out of a step.
///
/// Completes once every condition reports completed (immediately when it has none).
/// `target == None` ends the chapter.
pub struct Transition {
    life_cycle: LifeCycle,
    conditions: Vec<Box<dyn Condition>>,
    target: Option<StepId>,
    completed: bool,
}

impl Transition {
    /// Transition that ends the chapter.
    pub fn new() -> Self {
        Self {
            life_cycle: LifeCycle::new(),
            conditions: Vec::new(),
            target: None,
            completed: false,
        }
    }

    pub fn to(target: StepId) -> Self {
        let mut transition = Self::new();
        transition.target = Some(target);
        transition
    }

    pub fn with_condition(mut self, condition: impl Condition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn add_condition(&mut self, condition: Box<dyn Condition>) {
        self.conditions.push(condition);
    }

    pub fn target(&self) -> Option<StepId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<StepId>) {
        self.target = target;
    }

    pub fn conditions(&self) -> &[Box<dyn Condition>] {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut [Box<dyn Condition>] {
        &mut self.conditions
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn references(&self) -> Vec<SceneReference> {
        self.conditions
            .iter()
            .flat_map(|condition| condition.references())
            .collect()
    }

    fn all_conditions(&self, stage: Stage) -> bool {
        self.conditions.iter().all(|c| c.stage() == stage)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new()
    }
}

impl StageProcess for Transition {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                self.completed = false;
                for condition in &mut self.conditions {
                    let type_name = condition.type_name();
                    activate_child(condition.as_mut(), Some(type_name), ctx);
                }
            }
            Stage::Deactivating => {
                for condition in &mut self.conditions {
                    request_deactivation(condition.as_mut(), ctx);
                }
            }
            Stage::Aborting => {
                for condition in &mut self.conditions {
                    abort_child(condition.as_mut(), ctx);
                }
            }
            _ => {}
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        match stage {
            Stage::Activating => {
                if self.conditions.iter().any(|c| c.stage() == Stage::Activating) {
                    return Tick::Pending;
                }
                Tick::Done
            }
            Stage::Active => {
                if self.conditions.iter().all(|c| c.is_completed()) {
                    self.completed = true;
                    return Tick::Done;
                }
                Tick::Pending
            }
            Stage::Deactivating => {
                for condition in &mut self.conditions {
                    request_deactivation(condition.as_mut(), ctx);
                }
                if self.all_conditions(Stage::Inactive) {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Aborting => {
                if self.all_conditions(Stage::Inactive) {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Inactive => Tick::Done,
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        for condition in &mut self.conditions {
            match stage {
                Stage::Active => lifecycle::mark_to_fast_forward(condition.as_mut(), ctx),
                Stage::Activating | Stage::Deactivating => {
                    lifecycle::mark_to_fast_forward_stage(condition.as_mut(), stage, ctx)
                }
                _ => {}
            }
        }
    }
}

impl Entity for Transition {
    fn kind(&self) -> EntityKind {
        EntityKind::Transition
    }

    fn name(&self) -> &str {
        "transition"
    }

    fn life_cycle(&self) -> &LifeCycle {
        &self.life_cycle
    }

    fn life_cycle_mut(&mut self) -> &mut LifeCycle {
        &mut self.life_cycle
    }

    fn update_children(&mut self, ctx: &mut ProcessContext) {
        for condition in &mut self.conditions {
            lifecycle::update(condition.as_mut(), ctx);
        }
    }
}
