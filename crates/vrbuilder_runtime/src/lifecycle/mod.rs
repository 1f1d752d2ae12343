//! vrbuilder_runtime::lifecycle
//!
//! Driving a process from a host loop: pause gate, runner, event stream, ticker.

mod gate;
pub use gate::PauseGate;

// Stage event stream handed to subscribers.
mod events;
pub use events::RunnerEvent;

mod runner;
pub use runner::ProcessRunner;

mod managed_ticker;
pub use managed_ticker::ManagedTicker;
