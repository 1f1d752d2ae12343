use std::collections::BTreeSet;

use tracing::warn;
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess, Tick};

use super::{
    abort_child, activate_child, request_deactivation, Behavior, Entity, EntityKind, StepId,
    Transition,
};

/// A step runs its behaviors, then evaluates its transitions.
///
/// Stage processes:
/// - Activating: unlock referenced scene objects, activate behaviors, wait for the
///   blocking ones
/// - Active: activate transitions, wait until one of them completes
/// - Deactivating / Aborting: bring every child back to Inactive, release locks
///
/// Transitions are evaluated in declaration order and the first one to complete wins.
/// From then on the others are no longer ticked while active, so at most one
/// transition completes per visit.
pub struct Step {
    id: StepId,
    name: String,
    description: String,
    life_cycle: LifeCycle,
    behaviors: Vec<Box<dyn Behavior>>,
    transitions: Vec<Transition>,
    completed: Option<usize>,
    fast_forward_choice: Option<usize>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(StepId::new(), name)
    }

    pub fn with_id(id: StepId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            life_cycle: LifeCycle::new(),
            behaviors: Vec::new(),
            transitions: Vec::new(),
            completed: None,
            fast_forward_choice: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behaviors.push(behavior);
    }

    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn behaviors(&self) -> &[Box<dyn Behavior>] {
        &self.behaviors
    }

    pub fn behaviors_mut(&mut self) -> &mut [Box<dyn Behavior>] {
        &mut self.behaviors
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    /// Index of the transition that completed during the current visit.
    pub fn completed_transition(&self) -> Option<usize> {
        self.completed
    }

    /// Where the step leads once it is done: `Some(target)` after a transition
    /// completed (`target == None` ends the chapter), `None` while still running.
    pub fn outcome(&self) -> Option<Option<StepId>> {
        if self.stage() != Stage::Active {
            return None;
        }
        self.completed.map(|index| self.transitions[index].target())
    }

    /// Fast-forward the step, completing transition `index` instead of the first one.
    pub fn mark_to_fast_forward_via(&mut self, index: usize, ctx: &mut ProcessContext) {
        self.fast_forward_choice = Some(index);
        lifecycle::mark_to_fast_forward(self, ctx);
    }

    fn requester(&self) -> Uuid {
        self.id.0
    }

    fn request_unlocks(&self, ctx: &mut ProcessContext) {
        let objects: BTreeSet<Uuid> = self
            .transitions
            .iter()
            .flat_map(Transition::references)
            .flat_map(|reference| ctx.scene().resolve_ids(&reference))
            .collect();

        for id in objects {
            if let Some(object) = ctx.scene_mut().get_mut(id) {
                object.request_locked(false, self.requester());
            }
        }
    }

    fn children_inactive(&self) -> bool {
        self.behaviors.iter().all(|b| b.stage() == Stage::Inactive)
            && self.transitions.iter().all(|t| t.stage() == Stage::Inactive)
    }

    fn fast_forward_transition(&mut self, ctx: &mut ProcessContext) {
        if self.completed.is_some() {
            return;
        }
        let index = self.fast_forward_choice.unwrap_or(0);
        let Some(transition) = self.transitions.get_mut(index) else {
            warn!(step = %self.name, index, "no transition to fast-forward");
            return;
        };
        lifecycle::mark_to_fast_forward(transition, ctx);
        if transition.is_completed() {
            self.completed = Some(index);
        }
    }
}

impl StageProcess for Step {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                self.completed = None;
                self.request_unlocks(ctx);
                for behavior in &mut self.behaviors {
                    let type_name = behavior.type_name();
                    activate_child(behavior.as_mut(), Some(type_name), ctx);
                }
            }
            Stage::Active => {
                for transition in &mut self.transitions {
                    activate_child(transition, None, ctx);
                }
            }
            Stage::Deactivating => {
                for behavior in &mut self.behaviors {
                    request_deactivation(behavior.as_mut(), ctx);
                }
                for transition in &mut self.transitions {
                    request_deactivation(transition, ctx);
                }
            }
            Stage::Aborting => {
                for behavior in &mut self.behaviors {
                    abort_child(behavior.as_mut(), ctx);
                }
                for transition in &mut self.transitions {
                    abort_child(transition, ctx);
                }
            }
            Stage::Inactive => {}
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        match stage {
            Stage::Activating => {
                let waiting = self
                    .behaviors
                    .iter()
                    .any(|b| b.is_blocking() && b.stage() == Stage::Activating);
                if waiting {
                    Tick::Pending
                } else {
                    Tick::Done
                }
            }
            Stage::Active => {
                if self.completed.is_some() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Deactivating => {
                for behavior in &mut self.behaviors {
                    request_deactivation(behavior.as_mut(), ctx);
                }
                for transition in &mut self.transitions {
                    request_deactivation(transition, ctx);
                }
                if self.children_inactive() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Aborting => {
                if self.children_inactive() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Inactive => Tick::Done,
        }
    }

    fn on_end(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if matches!(stage, Stage::Deactivating | Stage::Aborting) {
            ctx.scene_mut().release_requests(self.requester());
            self.fast_forward_choice = None;
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                for behavior in &mut self.behaviors {
                    lifecycle::mark_to_fast_forward_stage(
                        behavior.as_mut(),
                        Stage::Activating,
                        ctx,
                    );
                }
            }
            Stage::Active => self.fast_forward_transition(ctx),
            Stage::Deactivating => {
                for behavior in &mut self.behaviors {
                    lifecycle::mark_to_fast_forward_stage(
                        behavior.as_mut(),
                        Stage::Deactivating,
                        ctx,
                    );
                }
                for transition in &mut self.transitions {
                    lifecycle::mark_to_fast_forward_stage(transition, Stage::Deactivating, ctx);
                }
            }
            _ => {}
        }
    }
}

impl Entity for Step {
    fn kind(&self) -> EntityKind {
        EntityKind::Step
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

    fn update_children(&mut self, ctx: &mut ProcessContext) {
        for behavior in &mut self.behaviors {
            lifecycle::update(behavior.as_mut(), ctx);
        }

        for (index, transition) in self.transitions.iter_mut().enumerate() {
            let evaluating = transition.stage() == Stage::Active;
            if evaluating && self.completed.is_some_and(|winner| winner != index) {
                continue;
            }
            lifecycle::update(transition, ctx);
            if self.completed.is_none() && transition.is_completed() {
                self.completed = Some(index);
            }
        }
    }
}
