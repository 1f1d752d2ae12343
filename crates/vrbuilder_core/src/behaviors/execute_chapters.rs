use std::any::Any;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::ProcessContext;
use crate::entity::{
    abort_child, activate_child, request_deactivation, Behavior, Chapter, Entity, EntityKind,
};
use crate::error::Result;
use crate::lifecycle::{self, LifeCycle, Stage, StageProcess, Tick};
use crate::registry::EntityRegistry;
use crate::serialization::ChapterDocument;

#[derive(Serialize, Deserialize)]
struct ExecuteChaptersData {
    chapters: Vec<ChapterDocument>,
}

/// Runs a set of sub-chapters side by side. Becomes active once every sub-chapter
/// has run to its end.
pub struct ExecuteChaptersBehavior {
    name: String,
    life_cycle: LifeCycle,
    chapters: Vec<Chapter>,
}

impl ExecuteChaptersBehavior {
    pub const TYPE_NAME: &'static str = "execute_chapters";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            life_cycle: LifeCycle::new(),
            chapters: Vec::new(),
        }
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapters_mut(&mut self) -> &mut [Chapter] {
        &mut self.chapters
    }

    /// Registry factory: sub-chapters are rebuilt with the same registry.
    pub fn from_data(
        registry: &EntityRegistry,
        name: &str,
        data: serde_json::Value,
    ) -> Result<Box<dyn Behavior>> {
        let data: ExecuteChaptersData = serde_json::from_value(data)?;
        let mut behavior = Self::new(name);
        for chapter in data.chapters {
            behavior.chapters.push(chapter.into_chapter(registry)?);
        }
        Ok(Box::new(behavior))
    }

    fn all_chapters(&self, stage: Stage) -> bool {
        self.chapters.iter().all(|chapter| chapter.stage() == stage)
    }
}

impl StageProcess for ExecuteChaptersBehavior {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        match stage {
            Stage::Activating => {
                for chapter in &mut self.chapters {
                    activate_child(chapter, None, ctx);
                }
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
        let done = match stage {
            Stage::Activating => self.all_chapters(Stage::Active),
            Stage::Deactivating => {
                for chapter in &mut self.chapters {
                    request_deactivation(chapter, ctx);
                }
                self.all_chapters(Stage::Inactive)
            }
            Stage::Aborting => self.all_chapters(Stage::Inactive),
            Stage::Active | Stage::Inactive => true,
        };
        if done {
            Tick::Done
        } else {
            Tick::Pending
        }
    }

    fn on_end(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if stage != Stage::Activating {
            return;
        }
        for chapter in &self.chapters {
            if let Some(step) = chapter.exit_target() {
                warn!(
                    behavior = %self.name,
                    chapter = chapter.name(),
                    %step,
                    "sub-chapter branched out, ignored"
                );
            }
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        for chapter in &mut self.chapters {
            match stage {
                Stage::Activating if chapter.stage() == Stage::Activating => {
                    lifecycle::mark_to_fast_forward(chapter, ctx);
                }
                Stage::Deactivating => {
                    lifecycle::mark_to_fast_forward_stage(chapter, Stage::Deactivating, ctx);
                }
                _ => {}
            }
        }
    }
}

impl Entity for ExecuteChaptersBehavior {
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

    fn update_children(&mut self, ctx: &mut ProcessContext) {
        for chapter in &mut self.chapters {
            lifecycle::update(chapter, ctx);
        }
    }
}

impl Behavior for ExecuteChaptersBehavior {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn to_data(&self) -> Result<serde_json::Value> {
        let chapters = self
            .chapters
            .iter()
            .map(ChapterDocument::from_chapter)
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::to_value(ExecuteChaptersData { chapters })?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::TimeoutCondition;
    use crate::entity::{ConditionEntity, Step, Transition};
    use std::time::Duration;

    fn path(name: &str, seconds: f32) -> Chapter {
        let timeout = ConditionEntity::new("timeout", TimeoutCondition::new(seconds));
        Chapter::new(name)
            .with_step(Step::new("wait").with_transition(Transition::new().with_condition(timeout)))
    }

    #[test]
    fn waits_for_every_sub_chapter() {
        let mut ctx = ProcessContext::default();
        let mut behavior = ExecuteChaptersBehavior::new("parallel")
            .with_chapter(path("Path 1", 0.2))
            .with_chapter(path("Path 2", 1.0));
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();

        for _ in 0..10 {
            ctx.advance(Duration::from_millis(100));
            lifecycle::update(&mut behavior, &mut ctx);
        }
        assert_eq!(behavior.chapters()[0].stage(), Stage::Active);
        assert_eq!(behavior.chapters()[1].stage(), Stage::Activating);
        assert_eq!(behavior.stage(), Stage::Activating);

        for _ in 0..10 {
            ctx.advance(Duration::from_millis(100));
            lifecycle::update(&mut behavior, &mut ctx);
        }
        assert_eq!(behavior.stage(), Stage::Active);
    }

    #[test]
    fn fast_forward_finishes_sub_chapters() {
        let mut ctx = ProcessContext::default();
        let mut behavior = ExecuteChaptersBehavior::new("parallel")
            .with_chapter(path("Path 1", 100.0))
            .with_chapter(path("Path 2", 100.0));
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();
        lifecycle::mark_to_fast_forward(&mut behavior, &mut ctx);

        assert_eq!(behavior.stage(), Stage::Active);
        assert!(behavior.chapters().iter().all(|c| c.stage() == Stage::Active));
    }
}
