use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::property::{
    GrabbableProperty, MomentaryControlProperty, SettableControlProperty, SnapZoneProperty,
    SnappableProperty, TeleportationProperty, TouchableProperty, UsableProperty,
};
use super::simulated::{
    SimulatedGrabbable, SimulatedMomentaryControl, SimulatedSettableControl, SimulatedSnapZone,
    SimulatedSnappable, SimulatedTeleportation, SimulatedTouchable, SimulatedUsable,
};

/// Capability names used by scene documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Grabbable,
    Touchable,
    Usable,
    Snappable,
    SnapZone,
    Teleportation,
    SettableControl,
    MomentaryControl,
}

/// Property slots of a scene object. Empty slot = capability not present.
#[derive(Default)]
pub struct Capabilities {
    pub grabbable: Option<Box<dyn GrabbableProperty>>,
    pub touchable: Option<Box<dyn TouchableProperty>>,
    pub usable: Option<Box<dyn UsableProperty>>,
    pub snappable: Option<Box<dyn SnappableProperty>>,
    pub snap_zone: Option<Box<dyn SnapZoneProperty>>,
    pub teleportation: Option<Box<dyn TeleportationProperty>>,
    pub settable_control: Option<Box<dyn SettableControlProperty>>,
    pub momentary_control: Option<Box<dyn MomentaryControlProperty>>,
}

impl Capabilities {
    /// Install the simulated implementation of `capability`.
    pub fn install_simulated(&mut self, capability: Capability) {
        match capability {
            Capability::Grabbable => self.grabbable = Some(Box::<SimulatedGrabbable>::default()),
            Capability::Touchable => self.touchable = Some(Box::<SimulatedTouchable>::default()),
            Capability::Usable => self.usable = Some(Box::<SimulatedUsable>::default()),
            Capability::Snappable => self.snappable = Some(Box::<SimulatedSnappable>::default()),
            Capability::SnapZone => self.snap_zone = Some(Box::<SimulatedSnapZone>::default()),
            Capability::Teleportation => {
                self.teleportation = Some(Box::<SimulatedTeleportation>::default())
            }
            Capability::SettableControl => {
                self.settable_control = Some(Box::<SimulatedSettableControl>::default())
            }
            Capability::MomentaryControl => {
                self.momentary_control = Some(Box::<SimulatedMomentaryControl>::default())
            }
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Grabbable => self.grabbable.is_some(),
            Capability::Touchable => self.touchable.is_some(),
            Capability::Usable => self.usable.is_some(),
            Capability::Snappable => self.snappable.is_some(),
            Capability::SnapZone => self.snap_zone.is_some(),
            Capability::Teleportation => self.teleportation.is_some(),
            Capability::SettableControl => self.settable_control.is_some(),
            Capability::MomentaryControl => self.momentary_control.is_some(),
        }
    }
}

/// A live object in the scene: identity, groups, position, lock state and properties.
///
/// Locking:
/// - `set_locked()` sets the base lock
/// - `request_locked(false, requester)` adds one unlock request for `requester`
/// - `request_locked(true, requester)` withdraws one of them
/// - the object is locked iff the base lock is set and no unlock request is left
pub struct SceneObject {
    id: Uuid,
    name: String,
    groups: BTreeSet<Uuid>,
    position: [f32; 3],
    locked: bool,
    unlock_requests: BTreeMap<Uuid, u32>,
    pub capabilities: Capabilities,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            groups: BTreeSet::new(),
            position: [0.0; 3],
            locked: false,
            unlock_requests: BTreeMap::new(),
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_group(mut self, group: Uuid) -> Self {
        self.groups.insert(group);
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.install_simulated(capability);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_in_group(&self, group: Uuid) -> bool {
        self.groups.contains(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.groups.iter().copied()
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    pub fn set_position(&mut self, position: [f32; 3]) {
        self.position = position;
    }

    pub fn is_locked(&self) -> bool {
        self.locked && self.unlock_requests.is_empty()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn request_locked(&mut self, locked: bool, requester: Uuid) {
        if !locked {
            *self.unlock_requests.entry(requester).or_insert(0) += 1;
            return;
        }

        if let Some(count) = self.unlock_requests.get_mut(&requester) {
            *count -= 1;
            if *count == 0 {
                self.unlock_requests.remove(&requester);
            }
        }
    }

    /// Drop every unlock request `requester` still holds.
    pub fn release_requests(&mut self, requester: Uuid) {
        self.unlock_requests.remove(&requester);
    }

    pub fn unlock_request_count(&self) -> u32 {
        self.unlock_requests.values().sum()
    }
}

impl std::fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("position", &self.position)
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
