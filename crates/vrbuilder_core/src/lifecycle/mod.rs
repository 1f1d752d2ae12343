//! vrbuilder_core::lifecycle
//!
//! Stage model shared by every entity of a process.
//!
//! Key ideas:
//! - Two rest stages (Inactive, Active) + three transient ones
//! - Explicit request pipeline: `begin()` -> stage process ticks -> `finish()`
//! - Fast-forward is a per-stage request, applied now or when the stage is reached
//! - Entities own a `LifeCycle`; only the functions re-exported here move it

mod engine;
mod event;
mod graph;
mod life_cycle;
mod state;
mod transition;

pub use engine::{
    abort, activate, available_requests, begin, deactivate, finish, mark_to_fast_forward,
    mark_to_fast_forward_stage, update, StageProcess, Tick,
};
pub use event::StageEvent;
pub use graph::{stage_graph, StageEdge, StageGraph};
pub use life_cycle::LifeCycle;
pub use state::{Stage, ALL_STAGES};
pub use transition::Request;
