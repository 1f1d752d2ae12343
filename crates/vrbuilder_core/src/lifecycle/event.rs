use crate::entity::EntityKind;

use super::Stage;

/// Emitted on every stage change of every entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEvent {
    pub kind: EntityKind,
    pub name: String,
    pub from: Stage,
    pub to: Stage,
}
