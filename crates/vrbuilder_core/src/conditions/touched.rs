use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes while the target objects are being touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchedCondition {
    pub target: SceneReference,
    #[serde(default)]
    pub quantifier: Quantifier,
    #[serde(skip)]
    reported_empty: bool,
}

impl TouchedCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            quantifier: Quantifier::All,
            reported_empty: false,
        }
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }
}

impl ConditionLogic for TouchedCondition {
    const TYPE_NAME: &'static str = "touched";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let states = ctx
            .scene()
            .select(&self.target, |c| c.touchable.as_deref())
            .into_iter()
            .map(|(_, touchable)| touchable.is_being_touched())
            .collect();
        quantified(Self::TYPE_NAME, self.quantifier, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let mut targets = ctx.scene_mut().select_mut(&self.target, |c| c.touchable.as_deref_mut());
        if self.quantifier == Quantifier::Any {
            targets.truncate(1);
        }
        // The touch is left ongoing: the condition observes the touching state.
        for (_, touchable) in targets {
            touchable.fast_forward_touch();
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}
