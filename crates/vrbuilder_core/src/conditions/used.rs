use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes when the target objects are used. With `require_release` a use has to
/// be finished before it counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedCondition {
    pub target: SceneReference,
    #[serde(default)]
    pub quantifier: Quantifier,
    #[serde(default)]
    pub require_release: bool,
    #[serde(skip)]
    used: BTreeSet<Uuid>,
    #[serde(skip)]
    reported_empty: bool,
}

impl UsedCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            quantifier: Quantifier::All,
            require_release: false,
            used: BTreeSet::new(),
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

impl ConditionLogic for UsedCondition {
    const TYPE_NAME: &'static str = "used";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.used.clear();
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let targets = ctx.scene().select(&self.target, |c| c.usable.as_deref());

        let states = if self.require_release {
            for (id, usable) in &targets {
                if usable.is_being_used() {
                    self.used.insert(*id);
                }
            }
            targets
                .iter()
                .map(|(id, usable)| self.used.contains(id) && !usable.is_being_used())
                .collect()
        } else {
            targets.iter().map(|(_, usable)| usable.is_being_used()).collect()
        };

        quantified(Self::TYPE_NAME, self.quantifier, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let mut targets = ctx.scene_mut().select_mut(&self.target, |c| c.usable.as_deref_mut());
        if self.quantifier == Quantifier::Any {
            targets.truncate(1);
        }
        for (id, usable) in targets {
            usable.fast_forward_use();
            if self.require_release {
                self.used.insert(id);
                usable.fast_forward_stop_use();
            }
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}
