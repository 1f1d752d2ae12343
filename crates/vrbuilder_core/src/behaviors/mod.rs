//! Built-in behaviors.
//!
//! Behaviors do their work while activating; a step waits for its blocking
//! behaviors before it evaluates transitions.

mod delay;
mod execute_chapters;
mod move_object;
mod set_object_locked;

pub use delay::DelayBehavior;
pub use execute_chapters::ExecuteChaptersBehavior;
pub use move_object::MoveObjectBehavior;
pub use set_object_locked::SetObjectLockedBehavior;
