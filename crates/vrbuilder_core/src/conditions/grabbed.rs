use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes when the target objects are grabbed.
///
/// With `require_release`, an object only counts once it was grabbed and let go
/// again during this activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabbedCondition {
    pub target: SceneReference,
    #[serde(default)]
    pub quantifier: Quantifier,
    #[serde(default)]
    pub require_release: bool,
    #[serde(skip)]
    grabbed: BTreeSet<Uuid>,
    #[serde(skip)]
    reported_empty: bool,
}

impl GrabbedCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            quantifier: Quantifier::All,
            require_release: false,
            grabbed: BTreeSet::new(),
            reported_empty: false,
        }
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }

    pub fn with_require_release(mut self, require_release: bool) -> Self {
        self.require_release = require_release;
        self
    }
}

impl ConditionLogic for GrabbedCondition {
    const TYPE_NAME: &'static str = "grabbed";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.grabbed.clear();
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let targets = ctx.scene().select(&self.target, |c| c.grabbable.as_deref());

        let states = if self.require_release {
            for (id, grabbable) in &targets {
                if grabbable.is_grabbed() {
                    self.grabbed.insert(*id);
                }
            }
            targets
                .iter()
                .map(|(id, grabbable)| self.grabbed.contains(id) && !grabbable.is_grabbed())
                .collect()
        } else {
            targets.iter().map(|(_, grabbable)| grabbable.is_grabbed()).collect()
        };

        quantified(Self::TYPE_NAME, self.quantifier, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let mut targets = ctx.scene_mut().select_mut(&self.target, |c| c.grabbable.as_deref_mut());
        if self.quantifier == Quantifier::Any {
            targets.truncate(1);
        }
        for (id, grabbable) in targets {
            grabbable.fast_forward_grab();
            if self.require_release {
                self.grabbed.insert(id);
                grabbable.fast_forward_release();
            }
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}

/// Completes when none of the target objects is held anymore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasedCondition {
    pub target: SceneReference,
    #[serde(skip)]
    reported_empty: bool,
}

impl ReleasedCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            reported_empty: false,
        }
    }
}

impl ConditionLogic for ReleasedCondition {
    const TYPE_NAME: &'static str = "released";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let states = ctx
            .scene()
            .select(&self.target, |c| c.grabbable.as_deref())
            .into_iter()
            .map(|(_, grabbable)| !grabbable.is_grabbed())
            .collect();
        quantified(Self::TYPE_NAME, Quantifier::All, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let grabbables = ctx
            .scene_mut()
            .select_mut(&self.target, |c| c.grabbable.as_deref_mut());
        for (_, grabbable) in grabbables {
            grabbable.fast_forward_release();
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

    fn grab(ctx: &mut ProcessContext, id: Uuid, grabbed: bool) {
        let object = ctx.scene_mut().get_mut(id).unwrap();
        let grabbable = object.capabilities.grabbable.as_deref_mut().unwrap();
        if grabbed {
            grabbable.fast_forward_grab();
        } else {
            grabbable.fast_forward_release();
        }
    }

    #[test]
    fn all_and_any_quantifiers() {
        let (mut ctx, group, ids) = scene_with(Capability::Grabbable, 2);
        let mut all = GrabbedCondition::new(SceneReference::group(group));
        let mut any =
            GrabbedCondition::new(SceneReference::group(group)).with_quantifier(Quantifier::Any);

        grab(&mut ctx, ids[0], true);
        assert!(!all.check(&ctx));
        assert!(any.check(&ctx));

        grab(&mut ctx, ids[1], true);
        assert!(all.check(&ctx));
    }

    #[test]
    fn require_release_needs_grab_then_release() {
        let (mut ctx, group, ids) = scene_with(Capability::Grabbable, 1);
        let mut condition =
            GrabbedCondition::new(SceneReference::group(group)).with_require_release(true);
        condition.on_activate(&mut ctx);

        assert!(!condition.check(&ctx));
        grab(&mut ctx, ids[0], true);
        assert!(!condition.check(&ctx));
        grab(&mut ctx, ids[0], false);
        assert!(condition.check(&ctx));
    }

    #[test]
    fn released_waits_for_every_hand_to_let_go() {
        let (mut ctx, group, ids) = scene_with(Capability::Grabbable, 2);
        let mut condition = ReleasedCondition::new(SceneReference::group(group));

        grab(&mut ctx, ids[0], true);
        assert!(!condition.check(&ctx));
        grab(&mut ctx, ids[0], false);
        assert!(condition.check(&ctx));
    }

    #[test]
    fn unresolved_target_completes() {
        let mut ctx = ProcessContext::default();
        let mut condition = GrabbedCondition::new(SceneReference::object(Uuid::new_v4()));
        condition.on_activate(&mut ctx);
        assert!(condition.check(&ctx));
    }
}
