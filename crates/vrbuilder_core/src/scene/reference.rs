use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SceneObject;

/// Stored pointer to zero, one or many scene objects: explicit object ids and/or
/// group ids. Resolution happens in `SceneObjectRegistry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneReference {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Uuid>,
}

impl SceneReference {
    pub fn object(id: Uuid) -> Self {
        Self {
            objects: vec![id],
            groups: Vec::new(),
        }
    }

    pub fn group(id: Uuid) -> Self {
        Self {
            objects: Vec::new(),
            groups: vec![id],
        }
    }

    pub fn with_object(mut self, id: Uuid) -> Self {
        self.objects.push(id);
        self
    }

    pub fn with_group(mut self, id: Uuid) -> Self {
        self.groups.push(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.groups.is_empty()
    }

    pub fn matches(&self, object: &SceneObject) -> bool {
        self.objects.contains(&object.id())
            || self.groups.iter().any(|group| object.is_in_group(*group))
    }
}
