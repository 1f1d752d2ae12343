//! vrbuilder_core: stage engine for interactive training processes.
//!
//! A process is a tree of entities (process -> chapters -> steps -> transitions
//! and behaviors -> conditions) that all share one stage model. The host ticks the
//! root once per frame; the tick propagates synchronously down the tree.
//!
//! Design goals:
//! - Pure, testable logic (no async runtime, no engine bindings).
//! - Per-run state passed explicitly through a `ProcessContext`.
//! - Scene objects are reached through capability traits only.

pub mod error;

/// Stage model, request guards and the tick engine.
pub mod lifecycle;

/// Per-run context: clock, scene, mode, stage events.
pub mod context;

/// Scene-object capabilities, references and locks.
pub mod scene;

/// Process, chapter, step, transition, condition and behavior entities.
pub mod entity;

pub mod behaviors;
pub mod conditions;

/// Modes filtering which behavior/condition types run.
pub mod mode;

pub mod registry;
pub mod serialization;
