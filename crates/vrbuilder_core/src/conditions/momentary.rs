use serde::{Deserialize, Serialize};

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes when a momentary control (button) is pressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentaryPressedCondition {
    pub target: SceneReference,
    #[serde(skip)]
    reported_empty: bool,
}

impl MomentaryPressedCondition {
    pub fn new(target: SceneReference) -> Self {
        Self {
            target,
            reported_empty: false,
        }
    }
}

impl ConditionLogic for MomentaryPressedCondition {
    const TYPE_NAME: &'static str = "momentary_pressed";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.reported_empty = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        let states = ctx
            .scene()
            .select(&self.target, |c| c.momentary_control.as_deref())
            .into_iter()
            .map(|(_, control)| control.is_pressed())
            .collect();
        quantified(Self::TYPE_NAME, Quantifier::Any, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        let controls = ctx
            .scene_mut()
            .select_mut(&self.target, |c| c.momentary_control.as_deref_mut());
        if let Some((_, control)) = controls.into_iter().next() {
            control.fast_forward_press();
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}
