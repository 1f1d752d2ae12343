use std::collections::HashSet;

use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess, Tick};

use super::{
    abort_child, request_deactivation, Chapter, ChapterId, Entity, EntityKind, Step, StepId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running(usize),
    Leaving { from: usize, exit: Option<StepId> },
    Finished,
}

/// Root entity. Runs its chapters one after another, starting with the root chapter.
///
/// A chapter that branches out to a step of another chapter hands over to that
/// chapter, which starts from the branched-to step. The process reaches its Active
/// rest stage after the last chapter finished.
pub struct Process {
    id: Uuid,
    name: String,
    description: String,
    life_cycle: LifeCycle,
    chapters: Vec<Chapter>,
    current: Option<usize>,
    phase: Phase,
    fast_forwarding: bool,
    /// (chapter, entry step) pairs entered during the current fast-forward run.
    entered: HashSet<(usize, Option<StepId>)>,
    /// Steps visited during the current fast-forward run, across chapters.
    visited: HashSet<StepId>,
}

impl Process {
    pub fn new(name: impl Into<String>, root_chapter: Chapter) -> Self {
        Self::with_id(Uuid::new_v4(), name, root_chapter)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>, root_chapter: Chapter) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            life_cycle: LifeCycle::new(),
            chapters: vec![root_chapter],
            current: None,
            phase: Phase::Idle,
            fast_forwarding: false,
            entered: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    pub fn add_chapter(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn root_chapter(&self) -> &Chapter {
        &self.chapters[0]
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapters_mut(&mut self) -> &mut [Chapter] {
        &mut self.chapters
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id() == id)
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.current.map(|index| &self.chapters[index])
    }

    pub fn current_chapter_mut(&mut self) -> Option<&mut Chapter> {
        self.current.map(move |index| &mut self.chapters[index])
    }

    /// Step currently run by the current chapter.
    pub fn current_step(&self) -> Option<&Step> {
        self.current_chapter().and_then(Chapter::current_step)
    }

    pub fn find_step(&self, id: StepId) -> Option<&Step> {
        self.chapters.iter().find_map(|chapter| chapter.step(id))
    }

    /// True once the last chapter finished.
    pub fn is_finished(&self) -> bool {
        self.stage() == Stage::Active
    }

    fn chapter_owning(&self, id: StepId) -> Option<usize> {
        self.chapters.iter().position(|chapter| chapter.contains(id))
    }

    fn begin_chapter(&mut self, index: usize, entry: Option<StepId>, ctx: &mut ProcessContext) {
        self.current = Some(index);
        self.phase = Phase::Running(index);

        let chapter = &mut self.chapters[index];
        if let Some(step) = entry {
            chapter.enter_at(step);
        }
        if self.fast_forwarding {
            self.entered.insert((index, entry));
            chapter.carry_fast_forward_history(&self.visited);
            lifecycle::mark_to_fast_forward(chapter, ctx);
        }
        info!(process = %self.name, chapter = chapter.name(), "chapter started");
        if let Err(err) = lifecycle::activate(chapter, ctx) {
            warn!(process = %self.name, chapter = chapter.name(), "{err}");
        }
    }

    fn walk(&mut self, ctx: &mut ProcessContext) -> Tick {
        let mut budget = if self.fast_forwarding {
            self.chapters.len() + 1
        } else {
            1
        };

        loop {
            match self.phase {
                Phase::Idle | Phase::Finished => return Tick::Done,
                Phase::Running(index) => {
                    let chapter = &mut self.chapters[index];
                    if chapter.stage() != Stage::Active {
                        return Tick::Pending;
                    }
                    if self.fast_forwarding {
                        self.visited.extend(chapter.visited_steps().iter().copied());
                    }
                    let exit = chapter.exit_target();
                    if let Err(err) = lifecycle::deactivate(chapter, ctx) {
                        warn!(process = %self.name, chapter = chapter.name(), "{err}");
                    }
                    self.phase = Phase::Leaving { from: index, exit };
                }
                Phase::Leaving { from, exit } => {
                    if self.chapters[from].stage() != Stage::Inactive {
                        return Tick::Pending;
                    }
                    let next = match exit {
                        Some(step) => match self.chapter_owning(step) {
                            Some(index) => Some((index, Some(step))),
                            None => {
                                warn!(
                                    process = %self.name,
                                    %step,
                                    "transition target not found in any chapter"
                                );
                                None
                            }
                        },
                        None => Some(from + 1)
                            .filter(|index| *index < self.chapters.len())
                            .map(|index| (index, None)),
                    };
                    let Some((index, entry)) = next else {
                        self.phase = Phase::Finished;
                        return Tick::Done;
                    };
                    // Only reached when every transition of the loop led somewhere visited.
                    if self.fast_forwarding && self.entered.contains(&(index, entry)) {
                        warn!(process = %self.name, "fast-forward re-entered a chapter, stopping");
                        self.phase = Phase::Finished;
                        return Tick::Done;
                    }
                    if budget == 0 {
                        return Tick::Pending;
                    }
                    budget -= 1;
                    self.begin_chapter(index, entry, ctx);
                    if !self.fast_forwarding {
                        return Tick::Pending;
                    }
                }
            }
        }
    }

    fn chapters_inactive(&self) -> bool {
        self.chapters
            .iter()
            .all(|chapter| chapter.stage() == Stage::Inactive)
    }
}

impl StageProcess for Process {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                self.entered.clear();
                self.visited.clear();
                self.begin_chapter(0, None, ctx);
            }
            Stage::Deactivating => {
                for chapter in &mut self.chapters {
                    request_deactivation(chapter, ctx);
                }
            }
            Stage::Aborting => {
                for chapter in &mut self.chapters {
                    abort_child(chapter, ctx);
                }
            }
            _ => {}
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        match stage {
            Stage::Activating => self.walk(ctx),
            Stage::Deactivating => {
                for chapter in &mut self.chapters {
                    request_deactivation(chapter, ctx);
                }
                if self.chapters_inactive() {
                    Tick::Done
                } else {
                    Tick::Pending
                }
            }
            Stage::Aborting => {
                if self.chapters_inactive() {
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
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                if !self.fast_forwarding {
                    self.fast_forwarding = true;
                    self.entered.clear();
                    self.visited.clear();
                }
                match self.phase {
                    Phase::Running(index) => {
                        lifecycle::mark_to_fast_forward(&mut self.chapters[index], ctx);
                    }
                    Phase::Leaving { from, .. } => {
                        lifecycle::mark_to_fast_forward_stage(
                            &mut self.chapters[from],
                            Stage::Deactivating,
                            ctx,
                        );
                    }
                    Phase::Idle | Phase::Finished => {}
                }
            }
            Stage::Deactivating => {
                for chapter in &mut self.chapters {
                    lifecycle::mark_to_fast_forward_stage(chapter, Stage::Deactivating, ctx);
                }
            }
            _ => {}
        }
    }
}

impl Entity for Process {
    fn kind(&self) -> EntityKind {
        EntityKind::Process
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
        for chapter in &mut self.chapters {
            lifecycle::update(chapter, ctx);
        }
    }
}
