//! Process documents.
//!
//! The entity tree maps onto plain serde documents: every process, chapter and
//! step keeps its GUID, transitions reference their target by step GUID (possibly
//! in another chapter), and behaviors/conditions are stored as
//! `{ "type", "name", "data" }` and rebuilt through an `EntityRegistry`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::{
    Behavior, Chapter, ChapterId, Condition, Entity, Process, Step, StepId, Transition,
};
use crate::error::{CoreError, Domain, ErrorKind, Result};
use crate::registry::EntityRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

impl EntityDocument {
    fn from_condition(condition: &dyn Condition) -> Result<Self> {
        Ok(Self {
            type_name: condition.type_name().to_string(),
            name: condition.name().to_string(),
            data: condition.to_data()?,
        })
    }

    fn from_behavior(behavior: &dyn Behavior) -> Result<Self> {
        Ok(Self {
            type_name: behavior.type_name().to_string(),
            name: behavior.name().to_string(),
            data: behavior.to_data()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDocument {
    /// `None` ends the chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<StepId>,
    #[serde(default)]
    pub conditions: Vec<EntityDocument>,
}

impl TransitionDocument {
    pub fn from_transition(transition: &Transition) -> Result<Self> {
        Ok(Self {
            target: transition.target(),
            conditions: transition
                .conditions()
                .iter()
                .map(|condition| EntityDocument::from_condition(condition.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    pub fn into_transition(self, registry: &EntityRegistry) -> Result<Transition> {
        let mut transition = Transition::new();
        transition.set_target(self.target);
        for condition in self.conditions {
            transition.add_condition(registry.create_condition(
                &condition.type_name,
                &condition.name,
                condition.data,
            )?);
        }
        Ok(transition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDocument {
    pub id: StepId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub behaviors: Vec<EntityDocument>,
    #[serde(default)]
    pub transitions: Vec<TransitionDocument>,
}

impl StepDocument {
    pub fn from_step(step: &Step) -> Result<Self> {
        Ok(Self {
            id: step.id(),
            name: step.name().to_string(),
            description: step.description().to_string(),
            behaviors: step
                .behaviors()
                .iter()
                .map(|behavior| EntityDocument::from_behavior(behavior.as_ref()))
                .collect::<Result<_>>()?,
            transitions: step
                .transitions()
                .iter()
                .map(TransitionDocument::from_transition)
                .collect::<Result<_>>()?,
        })
    }

    pub fn into_step(self, registry: &EntityRegistry) -> Result<Step> {
        let mut step = Step::with_id(self.id, self.name).with_description(self.description);
        for behavior in self.behaviors {
            step.add_behavior(registry.create_behavior(
                &behavior.type_name,
                &behavior.name,
                behavior.data,
            )?);
        }
        for transition in self.transitions {
            step.add_transition(transition.into_transition(registry)?);
        }
        Ok(step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDocument {
    pub id: ChapterId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_step: Option<StepId>,
    #[serde(default)]
    pub steps: Vec<StepDocument>,
}

impl ChapterDocument {
    pub fn from_chapter(chapter: &Chapter) -> Result<Self> {
        Ok(Self {
            id: chapter.id(),
            name: chapter.name().to_string(),
            first_step: chapter.first_step(),
            steps: chapter
                .steps()
                .iter()
                .map(StepDocument::from_step)
                .collect::<Result<_>>()?,
        })
    }

    pub fn into_chapter(self, registry: &EntityRegistry) -> Result<Chapter> {
        let mut chapter = Chapter::with_id(self.id, self.name);
        for step in self.steps {
            chapter.add_step(step.into_step(registry)?);
        }
        if let Some(first) = self.first_step {
            chapter.set_first_step(first)?;
        }
        Ok(chapter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDocument {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The first chapter is the root chapter.
    pub chapters: Vec<ChapterDocument>,
}

impl ProcessDocument {
    pub fn from_process(process: &Process) -> Result<Self> {
        Ok(Self {
            id: process.id(),
            name: process.name().to_string(),
            description: process.description().to_string(),
            chapters: process
                .chapters()
                .iter()
                .map(ChapterDocument::from_chapter)
                .collect::<Result<_>>()?,
        })
    }

    pub fn into_process(self, registry: &EntityRegistry) -> Result<Process> {
        let mut chapters = self.chapters.into_iter();
        let root = chapters.next().ok_or_else(|| {
            CoreError::warn()
                .domain(Domain::Serialization)
                .kind(ErrorKind::InvalidArgument)
                .msg("process document has no chapter")
                .build()
        })?;

        let mut process = Process::with_id(self.id, self.name, root.into_chapter(registry)?)
            .with_description(self.description);
        for chapter in chapters {
            process.add_chapter(chapter.into_chapter(registry)?);
        }
        Ok(process)
    }
}

/// Byte-level process storage.
pub trait ProcessSerializer {
    fn serialize_process(&self, process: &Process) -> Result<Vec<u8>>;
    fn deserialize_process(&self, bytes: &[u8]) -> Result<Process>;
}

/// JSON storage; behaviors and conditions are rebuilt through `registry`.
#[derive(Debug, Clone)]
pub struct JsonProcessSerializer {
    registry: EntityRegistry,
    pretty: bool,
}

impl JsonProcessSerializer {
    pub fn new(registry: EntityRegistry) -> Self {
        Self {
            registry,
            pretty: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }
}

impl Default for JsonProcessSerializer {
    fn default() -> Self {
        Self::new(EntityRegistry::with_defaults())
    }
}

impl ProcessSerializer for JsonProcessSerializer {
    fn serialize_process(&self, process: &Process) -> Result<Vec<u8>> {
        let document = ProcessDocument::from_process(process)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };
        Ok(bytes)
    }

    fn deserialize_process(&self, bytes: &[u8]) -> Result<Process> {
        let document: ProcessDocument = serde_json::from_slice(bytes)?;
        document.into_process(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::TimeoutCondition;
    use crate::entity::ConditionEntity;
    use serde_json::json;

    #[test]
    fn missing_chapters_are_rejected() {
        let bytes = serde_json::to_vec(&json!({
            "id": Uuid::new_v4(),
            "name": "empty",
            "chapters": []
        }))
        .unwrap();
        let err = JsonProcessSerializer::default()
            .deserialize_process(&bytes)
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn transition_targets_survive_by_id() {
        let second = Step::new("second");
        let second_id = second.id();
        let first = Step::new("first").with_transition(
            Transition::to(second_id)
                .with_condition(ConditionEntity::new("wait", TimeoutCondition::new(1.0))),
        );
        let process = Process::new("p", Chapter::new("c").with_step(first).with_step(second));

        let serializer = JsonProcessSerializer::default();
        let bytes = serializer.serialize_process(&process).unwrap();
        let restored = serializer.deserialize_process(&bytes).unwrap();

        let chapter = restored.root_chapter();
        assert_eq!(chapter.steps()[0].transitions()[0].target(), Some(second_id));
        assert_eq!(chapter.first_step(), process.root_chapter().first_step());
    }
}
