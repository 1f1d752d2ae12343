//! Scene-object boundary.
//!
//! Conditions and behaviors never own scene state. They hold a `SceneReference`
//! and resolve it against the registry in the `ProcessContext` on every tick.

mod object;
mod property;
mod reference;
mod registry;
mod simulated;

pub use object::{Capabilities, Capability, SceneObject};
pub use property::{
    GrabbableProperty, MomentaryControlProperty, SettableControlProperty, SnapZoneProperty,
    SnappableProperty, TeleportationProperty, TouchableProperty, UsableProperty,
};
pub use reference::SceneReference;
pub use registry::SceneObjectRegistry;
pub use simulated::{
    SimulatedGrabbable, SimulatedMomentaryControl, SimulatedSettableControl,
    SimulatedSnapZone, SimulatedSnappable, SimulatedTeleportation, SimulatedTouchable,
    SimulatedUsable,
};
