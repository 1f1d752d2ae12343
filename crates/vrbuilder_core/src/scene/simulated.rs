//! In-memory property implementations.
//!
//! Used by headless runs and tests. Their `fast_forward_*` methods double as the
//! simulated end-user action.

use uuid::Uuid;

use super::property::{
    GrabbableProperty, MomentaryControlProperty, SettableControlProperty, SnapZoneProperty,
    SnappableProperty, TeleportationProperty, TouchableProperty, UsableProperty,
};

#[derive(Debug, Default, Clone)]
pub struct SimulatedGrabbable {
    grabbed: bool,
}

impl GrabbableProperty for SimulatedGrabbable {
    fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    fn fast_forward_grab(&mut self) {
        self.grabbed = true;
    }

    fn fast_forward_release(&mut self) {
        self.grabbed = false;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedTouchable {
    touched: bool,
}

impl TouchableProperty for SimulatedTouchable {
    fn is_being_touched(&self) -> bool {
        self.touched
    }

    fn fast_forward_touch(&mut self) {
        self.touched = true;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedUsable {
    used: bool,
}

impl UsableProperty for SimulatedUsable {
    fn is_being_used(&self) -> bool {
        self.used
    }

    fn fast_forward_use(&mut self) {
        self.used = true;
    }

    fn fast_forward_stop_use(&mut self) {
        self.used = false;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedSnappable {
    zone: Option<Uuid>,
}

impl SnappableProperty for SimulatedSnappable {
    fn snapped_zone(&self) -> Option<Uuid> {
        self.zone
    }

    fn fast_forward_snap_into(&mut self, zone: Uuid) {
        self.zone = Some(zone);
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedSnapZone {
    object: Option<Uuid>,
}

impl SnapZoneProperty for SimulatedSnapZone {
    fn snapped_object(&self) -> Option<Uuid> {
        self.object
    }

    fn fast_forward_snap(&mut self, object: Uuid) {
        self.object = Some(object);
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedTeleportation {
    teleported: bool,
}

impl TeleportationProperty for SimulatedTeleportation {
    fn was_used_to_teleport(&self) -> bool {
        self.teleported
    }

    fn reset_teleport(&mut self) {
        self.teleported = false;
    }

    fn fast_forward_teleport(&mut self) {
        self.teleported = true;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedSettableControl {
    value: f32,
}

impl SettableControlProperty for SimulatedSettableControl {
    fn current_value(&self) -> f32 {
        self.value
    }

    fn fast_forward_value(&mut self, value: f32) {
        self.value = value;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SimulatedMomentaryControl {
    pressed: bool,
}

impl MomentaryControlProperty for SimulatedMomentaryControl {
    fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn fast_forward_press(&mut self) {
        self.pressed = true;
    }
}
