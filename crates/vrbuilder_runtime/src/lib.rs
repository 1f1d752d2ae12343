//! vrbuilder_runtime
//!
//! Host-side driver for `vrbuilder_core` processes.
//! Owns a process and its context, ticks it on a tokio interval and fans stage
//! events out to subscribers, while all stage semantics stay in `vrbuilder_core`.

pub mod error;

pub mod lifecycle;

// Re-export core types that runtime users will commonly need
pub use vrbuilder_core::error::{CoreError, Result};
pub use vrbuilder_core::lifecycle::{Stage, StageEvent};
