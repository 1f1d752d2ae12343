use uuid::Uuid;

// Each capability exposes the state conditions poll and `fast_forward_*` methods that
// put the property into the state an end user would have produced.

pub trait GrabbableProperty: Send {
    fn is_grabbed(&self) -> bool;
    fn fast_forward_grab(&mut self);
    fn fast_forward_release(&mut self);
}

pub trait TouchableProperty: Send {
    fn is_being_touched(&self) -> bool;
    fn fast_forward_touch(&mut self);
}

pub trait UsableProperty: Send {
    fn is_being_used(&self) -> bool;
    fn fast_forward_use(&mut self);
    fn fast_forward_stop_use(&mut self);
}

pub trait SnappableProperty: Send {
    /// Zone the object currently sits in.
    fn snapped_zone(&self) -> Option<Uuid>;
    fn fast_forward_snap_into(&mut self, zone: Uuid);
}

pub trait SnapZoneProperty: Send {
    fn snapped_object(&self) -> Option<Uuid>;
    fn fast_forward_snap(&mut self, object: Uuid);
}

pub trait TeleportationProperty: Send {
    fn was_used_to_teleport(&self) -> bool;
    /// Forget earlier teleports so only new ones count.
    fn reset_teleport(&mut self);
    fn fast_forward_teleport(&mut self);
}

pub trait SettableControlProperty: Send {
    fn current_value(&self) -> f32;
    fn fast_forward_value(&mut self, value: f32);
}

pub trait MomentaryControlProperty: Send {
    fn is_pressed(&self) -> bool;
    fn fast_forward_press(&mut self);
}
