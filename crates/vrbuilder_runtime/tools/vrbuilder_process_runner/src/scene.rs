//! Scene documents: a JSON list of simulated scene objects.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vrbuilder_core::scene::{Capability, SceneObject, SceneObjectRegistry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectDocument {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Uuid>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub locked: bool,
}

impl SceneObjectDocument {
    pub fn into_object(self) -> SceneObject {
        let mut object = SceneObject::with_id(self.id, self.name)
            .with_position(self.position)
            .with_locked(self.locked);
        for group in self.groups {
            object = object.with_group(group);
        }
        for capability in self.capabilities {
            object = object.with_capability(capability);
        }
        object
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub objects: Vec<SceneObjectDocument>,
}

impl SceneDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("parse scene document")
    }

    pub fn into_registry(self) -> SceneObjectRegistry {
        let mut registry = SceneObjectRegistry::new();
        for object in self.objects {
            registry.insert(object.into_object());
        }
        registry
    }
}

pub fn load_scene(path: &Path) -> Result<SceneObjectRegistry> {
    let bytes = std::fs::read(path).with_context(|| format!("read scene {}", path.display()))?;
    Ok(SceneDocument::from_slice(&bytes)?.into_registry())
}
