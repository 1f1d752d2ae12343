use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::ProcessContext;
use crate::entity::ConditionLogic;
use crate::scene::SceneReference;

use super::{quantified, Quantifier};

/// Completes while every target control reports a value in `[min, max]`.
///
/// A range with `min > max` is a configuration error: it is reported once and the
/// condition never completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueInRangeCondition {
    pub target: SceneReference,
    pub min: f32,
    pub max: f32,
    #[serde(skip)]
    reported_empty: bool,
    #[serde(skip)]
    reported_range: bool,
}

impl ValueInRangeCondition {
    pub fn new(target: SceneReference, min: f32, max: f32) -> Self {
        Self {
            target,
            min,
            max,
            reported_empty: false,
            reported_range: false,
        }
    }

    fn valid_range(&mut self) -> bool {
        if self.min <= self.max {
            return true;
        }
        if !self.reported_range {
            self.reported_range = true;
            warn!(
                min = self.min,
                max = self.max,
                "min is greater than max, condition cannot complete"
            );
        }
        false
    }
}

impl ConditionLogic for ValueInRangeCondition {
    const TYPE_NAME: &'static str = "value_in_range";

    fn on_activate(&mut self, _ctx: &mut ProcessContext) {
        self.reported_empty = false;
        self.reported_range = false;
    }

    fn check(&mut self, ctx: &ProcessContext) -> bool {
        if !self.valid_range() {
            return false;
        }
        let (min, max) = (self.min, self.max);
        let states = ctx
            .scene()
            .select(&self.target, |c| c.settable_control.as_deref())
            .into_iter()
            .map(|(_, control)| (min..=max).contains(&control.current_value()))
            .collect();
        quantified(Self::TYPE_NAME, Quantifier::All, states, &mut self.reported_empty)
    }

    fn autocomplete(&mut self, ctx: &mut ProcessContext) {
        if !self.valid_range() {
            return;
        }
        let middle = self.min + (self.max - self.min) / 2.0;
        let controls = ctx
            .scene_mut()
            .select_mut(&self.target, |c| c.settable_control.as_deref_mut());
        for (_, control) in controls {
            control.fast_forward_value(middle);
        }
    }

    fn references(&self) -> Vec<SceneReference> {
        vec![self.target.clone()]
    }
}
