use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::context::ProcessContext;
use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess, Tick};

use super::{abort_child, request_deactivation, ChapterId, Entity, EntityKind, Step, StepId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Waiting for the current step to complete a transition.
    Running(usize),
    /// Waiting for the outgoing step to reach Inactive.
    Leaving { from: usize, target: Option<StepId> },
    Finished,
}

/// Ordered steps walked from the first step along completed transitions.
///
/// The walk happens while the chapter is Activating; the chapter reaches its Active
/// rest stage once a transition leads out of it. A step is always fully deactivated
/// before its successor activates, even when the successor is the same step (loops).
///
/// While fast-forwarding, each step completes the first declared transition whose
/// target was not visited during this fast-forward run; if all were visited, the one
/// closest to a chapter exit wins. This keeps fast-forward from circling in loops.
/// Steps of other chapters count as visited when the enclosing process already went
/// through them in the same run.
pub struct Chapter {
    id: ChapterId,
    name: String,
    life_cycle: LifeCycle,
    steps: Vec<Step>,
    first_step: Option<StepId>,
    current: Option<usize>,
    phase: Phase,
    entry: Option<StepId>,
    exit_target: Option<StepId>,
    fast_forwarding: bool,
    visited: HashSet<StepId>,
    /// Steps visited by the enclosing run before this chapter started.
    history: HashSet<StepId>,
}

impl Chapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ChapterId::new(), name)
    }

    pub fn with_id(id: ChapterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            life_cycle: LifeCycle::new(),
            steps: Vec::new(),
            first_step: None,
            current: None,
            phase: Phase::Idle,
            entry: None,
            exit_target: None,
            fast_forwarding: false,
            visited: HashSet::new(),
            history: HashSet::new(),
        }
    }

    /// Append a step. The first step added becomes the first step of the chapter.
    pub fn with_step(mut self, step: Step) -> Self {
        self.add_step(step);
        self
    }

    pub fn add_step(&mut self, step: Step) {
        if self.first_step.is_none() {
            self.first_step = Some(step.id());
        }
        self.steps.push(step);
    }

    pub fn set_first_step(&mut self, id: StepId) -> Result<()> {
        if !self.contains(id) {
            return Err(CoreError::warn()
                .domain(Domain::Process)
                .kind(ErrorKind::InvalidArgument)
                .msg("first step must belong to the chapter")
                .payload(Payload::Context {
                    key: "step",
                    value: id.to_string().into(),
                })
                .build());
        }
        self.first_step = Some(id);
        Ok(())
    }

    pub fn id(&self) -> ChapterId {
        self.id
    }

    pub fn first_step(&self) -> Option<StepId> {
        self.first_step
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.index_of(id).map(|index| &self.steps[index])
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.index_of(id).map(move |index| &mut self.steps[index])
    }

    /// Step being run; `None` unless the chapter is walking its steps.
    pub fn current_step(&self) -> Option<&Step> {
        self.current.map(|index| &self.steps[index])
    }

    pub fn current_step_mut(&mut self) -> Option<&mut Step> {
        self.current.map(move |index| &mut self.steps[index])
    }

    /// Step outside this chapter that the last walk branched out to.
    pub fn exit_target(&self) -> Option<StepId> {
        self.exit_target
    }

    /// Start the next activation at `id` instead of the first step.
    pub(crate) fn enter_at(&mut self, id: StepId) {
        self.entry = Some(id);
    }

    /// Seed the next fast-forward run with steps already visited elsewhere.
    pub(crate) fn carry_fast_forward_history(&mut self, steps: &HashSet<StepId>) {
        self.history.clone_from(steps);
    }

    /// Steps visited during the last fast-forward run, including carried history.
    pub(crate) fn visited_steps(&self) -> &HashSet<StepId> {
        &self.visited
    }

    fn index_of(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id() == id)
    }

    fn leaves_chapter(&self, target: Option<StepId>) -> bool {
        target.map_or(true, |id| !self.contains(id))
    }

    fn begin_step(&mut self, index: usize, ctx: &mut ProcessContext) {
        self.current = Some(index);
        self.phase = Phase::Running(index);

        if self.fast_forwarding {
            self.visited.insert(self.steps[index].id());
            let choice = self.fast_forward_choice(index);
            self.steps[index].mark_to_fast_forward_via(choice, ctx);
        }

        let step = &mut self.steps[index];
        if let Err(err) = lifecycle::activate(step, ctx) {
            warn!(chapter = %self.name, step = step.name(), "{err}");
        }
    }

    /// Transition a fast-forwarded step at `index` should complete.
    fn fast_forward_choice(&self, index: usize) -> usize {
        let transitions = self.steps[index].transitions();

        let fresh = transitions.iter().position(|transition| {
            transition
                .target()
                .map_or(true, |id| !self.visited.contains(&id))
        });
        if let Some(choice) = fresh {
            return choice;
        }

        let distances = self.exit_distances();
        transitions
            .iter()
            .enumerate()
            .min_by_key(|(choice, transition)| {
                let distance = transition
                    .target()
                    .and_then(|id| distances.get(&id).copied())
                    .unwrap_or(usize::MAX);
                (distance, *choice)
            })
            .map(|(choice, _)| choice)
            .unwrap_or(0)
    }

    /// Number of further transitions each step needs to leave the chapter.
    /// Steps that cannot reach an exit are absent.
    fn exit_distances(&self) -> HashMap<StepId, usize> {
        let mut distances: HashMap<StepId, usize> = HashMap::new();
        loop {
            let mut changed = false;
            for step in &self.steps {
                let best = step
                    .transitions()
                    .iter()
                    .filter_map(|transition| match transition.target() {
                        target if self.leaves_chapter(target) => Some(0),
                        Some(id) => distances.get(&id).map(|distance| distance + 1),
                        None => Some(0),
                    })
                    .min();
                if let Some(best) = best {
                    if distances.get(&step.id()).map_or(true, |known| best < *known) {
                        distances.insert(step.id(), best);
                        changed = true;
                    }
                }
            }
            if !changed {
                return distances;
            }
        }
    }

    fn walk(&mut self, ctx: &mut ProcessContext) -> Tick {
        // Handovers per tick: one normally, bounded by the step count when fast-forwarding.
        let mut budget = if self.fast_forwarding {
            self.steps.len() + 1
        } else {
            1
        };

        loop {
            match self.phase {
                Phase::Idle | Phase::Finished => return Tick::Done,
                Phase::Running(index) => {
                    let Some(target) = self.steps[index].outcome() else {
                        return Tick::Pending;
                    };
                    let step = &mut self.steps[index];
                    if let Err(err) = lifecycle::deactivate(step, ctx) {
                        warn!(chapter = %self.name, step = step.name(), "{err}");
                    }
                    self.phase = Phase::Leaving {
                        from: index,
                        target,
                    };
                }
                Phase::Leaving { from, target } => {
                    if self.steps[from].stage() != Stage::Inactive {
                        return Tick::Pending;
                    }
                    let Some(target) = target else {
                        self.phase = Phase::Finished;
                        return Tick::Done;
                    };
                    let Some(next) = self.index_of(target) else {
                        self.exit_target = Some(target);
                        self.phase = Phase::Finished;
                        return Tick::Done;
                    };
                    if budget == 0 {
                        return Tick::Pending;
                    }
                    budget -= 1;
                    self.begin_step(next, ctx);
                    if !self.fast_forwarding {
                        return Tick::Pending;
                    }
                }
            }
        }
    }

    fn steps_inactive(&self) -> bool {
        self.steps.iter().all(|step| step.stage() == Stage::Inactive)
    }
}

impl StageProcess for Chapter {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                self.exit_target = None;
                self.visited.clear();
                let start = self.entry.take().or(self.first_step);
                match start.and_then(|id| self.index_of(id)) {
                    Some(index) => self.begin_step(index, ctx),
                    None => {
                        warn!(chapter = %self.name, "chapter has no step to start from");
                        self.phase = Phase::Finished;
                    }
                }
            }
            Stage::Deactivating => {
                for step in &mut self.steps {
                    request_deactivation(step, ctx);
                }
            }
            Stage::Aborting => {
                for step in &mut self.steps {
                    abort_child(step, ctx);
                }
            }
            _ => {}
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        match stage {
            Stage::Activating => self.walk(ctx),
            Stage::Deactivating => {
                for step in &mut self.steps {
                    request_deactivation(step, ctx);
                }
                if self.steps_inactive() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Aborting => {
                if self.steps_inactive() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Active | Stage::Inactive => Tick::Done,
        }
    }

    fn on_end(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if matches!(stage, Stage::Activating | Stage::Aborting) {
            self.current = None;
            self.phase = Phase::Idle;
            self.fast_forwarding = false;
            self.history.clear();
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                if !self.fast_forwarding {
                    self.fast_forwarding = true;
                    self.visited = std::mem::take(&mut self.history);
                }
                match self.phase {
                    Phase::Running(index) => {
                        if self.steps[index].completed_transition().is_none() {
                            self.visited.insert(self.steps[index].id());
                            let choice = self.fast_forward_choice(index);
                            self.steps[index].mark_to_fast_forward_via(choice, ctx);
                        }
                    }
                    Phase::Leaving { from, .. } => {
                        lifecycle::mark_to_fast_forward_stage(
                            &mut self.steps[from],
                            Stage::Deactivating,
                            ctx,
                        );
                    }
                    Phase::Idle | Phase::Finished => {}
                }
            }
            Stage::Deactivating => {
                for step in &mut self.steps {
                    lifecycle::mark_to_fast_forward_stage(step, Stage::Deactivating, ctx);
                }
            }
            _ => {}
        }
    }
}

impl Entity for Chapter {
    fn kind(&self) -> EntityKind {
        EntityKind::Chapter
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
        for step in &mut self.steps {
            lifecycle::update(step, ctx);
        }
    }
}
