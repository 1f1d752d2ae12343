use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes when a target object sits in one of the given snap zones.
/// An empty `zone` accepts any zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnappedCondition {
    pub target: SceneReference,
    #[serde(default)]
    pub zone: SceneReference,
    #[serde(skip)]
    reported_empty: bool,
}

impl SnappedCondition {
    pub fn new(target: SceneReference, zone: SceneReference) -> Self {
        Self {
            target,
            zone,
            reported_empty: false,
        }
    }

    fn accepts(&self, zones: &[Uuid], zone: Option<Uuid>) -> bool {
        match zone {
            Some(zone) => self.zone.is_empty() || zones.contains(&zone),
            None => false,
        }
    }
}

impl ConditionLogic for SnappedCondition {
    const TYPE_NAME: &'static str = "snapped";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let zones = ctx.scene().resolve_ids(&self.zone);
        let states = ctx
            .scene()
            .select(&self.target, |c| c.snappable.as_deref())
            .into_iter()
            .map(|(_, snappable)| self.accepts(&zones, snappable.snapped_zone()))
            .collect();
        quantified(Self::TYPE_NAME, Quantifier::Any, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let zone = ctx.scene().find(|object| {
            object.capabilities.snap_zone.is_some()
                && (self.zone.is_empty() || self.zone.matches(object))
        });
        let Some(zone) = zone else {
            return;
        };
        let object = ctx
            .scene_mut()
            .select_mut(&self.target, |c| c.snappable.as_deref_mut())
            .into_iter()
            .next()
            .map(|(id, snappable)| {
                snappable.fast_forward_snap_into(zone);
                id
            });
        if let Some(object) = object {
            if let Some(snap_zone) = ctx
                .scene_mut()
                .get_mut(zone)
                .and_then(|zone| zone.capabilities.snap_zone.as_deref_mut())
            {
                snap_zone.fast_forward_snap(object);
            }
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone(), self.zone.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Capability, SceneObject, SceneObjectRegistry};

    #[test]
    fn only_the_configured_zone_counts() {
        let mut scene = SceneObjectRegistry::new();
        let part = scene.insert(SceneObject::new("part").with_capability(Capability::Snappable));
        let right = scene.insert(SceneObject::new("right").with_capability(Capability::SnapZone));
        let wrong = scene.insert(SceneObject::new("wrong").with_capability(Capability::SnapZone));
        let mut ctx = ProcessContext::new(scene);

        let mut condition =
            SnappedCondition::new(SceneReference::object(part), SceneReference::object(right));
        assert!(!condition.check(&ctx));

        let snap_into = |ctx: &mut ProcessContext, zone: Uuid| {
            ctx.scene_mut()
                .get_mut(part)
                .unwrap()
                .capabilities
                .snappable
                .as_deref_mut()
                .unwrap()
                .fast_forward_snap_into(zone);
        };
        snap_into(&mut ctx, wrong);
        assert!(!condition.check(&ctx));
        snap_into(&mut ctx, right);
        assert!(condition.check(&ctx));
    }

    #[test]
    fn autocomplete_fills_the_zone() {
        let mut scene = SceneObjectRegistry::new();
        let part = scene.insert(SceneObject::new("part").with_capability(Capability::Snappable));
        let zone = scene.insert(SceneObject::new("zone").with_capability(Capability::SnapZone));
        let mut ctx = ProcessContext::new(scene);

        let mut condition =
            SnappedCondition::new(SceneReference::object(part), SceneReference::object(zone));
        condition.autocomplete(&mut ctx);

        assert!(condition.check(&ctx));
        let snap_zone = ctx.scene().get(zone).unwrap().capabilities.snap_zone.as_deref();
        assert_eq!(snap_zone.unwrap().snapped_object(), Some(part));
    }
}
