//! Stage events as seen by runner subscribers.

use std::time::Duration;

use vrbuilder_core::entity::EntityKind;
use vrbuilder_core::lifecycle::{Stage, StageEvent};

/// A stage change, stamped with the process clock of the tick that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerEvent {
    pub at: Duration,
    pub kind: EntityKind,
    pub name: String,
    pub from: Stage,
    pub to: Stage,
}

impl RunnerEvent {
    pub(crate) fn stamped(at: Duration, event: StageEvent) -> Self {
        Self {
            at,
            kind: event.kind,
            name: event.name,
            from: event.from,
            to: event.to,
        }
    }
}
