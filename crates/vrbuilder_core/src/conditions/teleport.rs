use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes when one of the target teleportation anchors is used after the
/// condition activated. Earlier teleports are forgotten on activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportCondition {
    pub target: SceneReference,
    #[serde(skip)]
    reported_empty: bool,
}

impl TeleportCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            reported_empty: false,
        }
    }
}

impl ConditionLogic for TeleportCondition {
    const TYPE_NAME: &'static str = "teleport";

    fn on_activate(&mut self, ctx: &mut ProcessContext) {
        self.reported_empty = false;
        let anchors = ctx
            .scene_mut()
            .select_mut(&self.target, |c| c.teleportation.as_deref_mut());
        for (_, anchor) in anchors {
            anchor.reset_teleport();
        }
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let states = ctx
            .scene()
            .select(&self.target, |c| c.teleportation.as_deref())
            .into_iter()
            .map(|(_, anchor)| anchor.was_used_to_teleport())
            .collect();
        quantified(Self::TYPE_NAME, Quantifier::Any, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let anchors = ctx.scene_mut().select_mut(&self.target, |c| c.teleportation.as_deref_mut());
        if let Some((_, anchor)) = anchors.into_iter().next() {
            anchor.fast_forward_teleport();
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::testing::scene_with;
    use crate::scene::Capability;

    #[test]
    fn teleport_before_activation_does_not_count() {
        let (mut ctx, group, ids) = scene_with(Capability::Teleportation, 1);
        ctx.scene_mut()
            .get_mut(ids[0])
            .unwrap()
            .capabilities
            .teleportation
            .as_deref_mut()
            .unwrap()
            .fast_forward_teleport();

        let mut condition = TeleportCondition::new(SceneReference::group(group));
        condition.on_activate(&mut ctx);
        assert!(!condition.check(&ctx));

        condition.autocomplete(&mut ctx);
        assert!(condition.check(&ctx));
    }
}
