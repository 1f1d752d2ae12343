use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::BehaviorLogic;
use crate::lifecycle::{Stage, StageProcess};
use crate::scene::SceneReference;

/// Sets the base lock state of the target objects on activation.
///
/// Unlock requests of running steps still take precedence over a lock set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetObjectLockedBehavior {
    pub target: SceneReference,
    pub locked: bool,
}

impl SetObjectLockedBehavior {
    pub fn new(target: SceneReference, locked: bool) -> Self {
        Self { target, locked }
    }
}

impl StageProcess for SetObjectLockedBehavior {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage != Stage::Activating {
            return;
        }
        for id in ctx.scene().resolve_ids(&self.target) {
            if let Some(object) = ctx.scene_mut().get_mut(id) {
                object.set_locked(self.locked);
            }
        }
    }
}

impl BehaviorLogic for SetObjectLockedBehavior {
    const TYPE_NAME: &'static str = "set_object_locked";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BehaviorEntity;
    use crate::lifecycle;
    use crate::scene::{SceneObject, SceneObjectRegistry};
    use uuid::Uuid;

    #[test]
    fn locks_every_resolved_object() {
        let group = Uuid::new_v4();
        let mut scene = SceneObjectRegistry::new();
        let a = scene.insert(SceneObject::new("a").with_group(group));
        let b = scene.insert(SceneObject::new("b").with_group(group));
        let mut ctx = ProcessContext::new(scene);

        let logic = SetObjectLockedBehavior::new(SceneReference::group(group), true);
        let mut behavior = BehaviorEntity::new("lock", logic);
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();

        assert!(ctx.scene().get(a).unwrap().is_locked());
        assert!(ctx.scene().get(b).unwrap().is_locked());
    }
}
