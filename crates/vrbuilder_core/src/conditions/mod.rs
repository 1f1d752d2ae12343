//! Built-in conditions.
//!
//! Each type here is a `ConditionLogic`; wrap it in a `ConditionEntity` to place it
//! on a transition. Conditions bound to scene objects poll the resolved properties
//! every tick and drive them through `fast_forward_*` when autocompleted.

use serde::{Deserialize, Serialize};
use tracing::error;

mod grabbed;
mod momentary;
mod snapped;
mod teleport;
mod timeout;
mod touched;
mod used;
mod value_in_range;

pub use grabbed::{GrabbedCondition, ReleasedCondition};
pub use momentary::MomentaryPressedCondition;
pub use snapped::SnappedCondition;
pub use teleport::TeleportCondition;
pub use timeout::TimeoutCondition;
pub use touched::TouchedCondition;
pub use used::UsedCondition;
pub use value_in_range::ValueInRangeCondition;

/// How many of the resolved targets must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    #[default]
    All,
    Any,
}

impl Quantifier {
    pub fn holds(self, mut states: impl Iterator<Item = bool>) -> bool {
        match self {
            Quantifier::All => states.all(|state| state),
            Quantifier::Any => states.any(|state| state),
        }
    }
}

/// Quantified check over one state per resolved target.
///
/// Zero targets complete the condition, with an error logged once per activation.
pub(crate) fn quantified(
    type_name: &'static str,
    quantifier: Quantifier,
    states: Vec<bool>,
    reported_empty: &mut bool,
) -> bool {
    if states.is_empty() {
        if !*reported_empty {
            *reported_empty = true;
            error!(
                condition = type_name,
                "no target property resolved, completing condition"
            );
        }
        return true;
    }
    quantifier.holds(states.into_iter())
}
