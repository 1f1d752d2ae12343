use std::collections::BTreeMap;

use uuid::Uuid;

use super::{Capabilities, SceneObject, SceneReference};

/// Live scene objects by id. Iteration order is stable (sorted by id).
#[derive(Debug, Default)]
pub struct SceneObjectRegistry {
    objects: BTreeMap<Uuid, SceneObject>,
}

impl SceneObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the object id.
    pub fn insert(&mut self, object: SceneObject) -> Uuid {
        let id = object.id();
        self.objects.insert(id, object);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn resolve<'a>(
        &'a self,
        reference: &'a SceneReference,
    ) -> impl Iterator<Item = &'a SceneObject> + 'a {
        self.objects
            .values()
            .filter(move |object| reference.matches(object))
    }

    pub fn resolve_ids(&self, reference: &SceneReference) -> Vec<Uuid> {
        self.resolve(reference).map(SceneObject::id).collect()
    }

    /// Resolve `reference` and pick one property slot from each match.
    /// Objects lacking the capability are skipped.
    pub fn select<'a, P: ?Sized + 'a>(
        &'a self,
        reference: &SceneReference,
        pick: impl Fn(&'a Capabilities) -> Option<&'a P>,
    ) -> Vec<(Uuid, &'a P)> {
        self.objects
            .values()
            .filter(|object| reference.matches(object))
            .filter_map(|object| pick(&object.capabilities).map(|property| (object.id(), property)))
            .collect()
    }

    pub fn select_mut<'a, P: ?Sized + 'a>(
        &'a mut self,
        reference: &SceneReference,
        pick: impl Fn(&'a mut Capabilities) -> Option<&'a mut P>,
    ) -> Vec<(Uuid, &'a mut P)> {
        self.objects
            .values_mut()
            .filter(|object| reference.matches(object))
            .filter_map(|object| {
                let id = object.id();
                pick(&mut object.capabilities).map(|property| (id, property))
            })
            .collect()
    }

    /// First object (by id order) satisfying `predicate`.
    pub fn find(&self, predicate: impl Fn(&SceneObject) -> bool) -> Option<Uuid> {
        self.objects
            .values()
            .find(|object| predicate(object))
            .map(SceneObject::id)
    }

    /// Drop every unlock request `requester` holds on any object.
    pub fn release_requests(&mut self, requester: Uuid) {
        for object in self.objects.values_mut() {
            object.release_requests(requester);
        }
    }

    pub fn lock_all(&mut self) {
        for object in self.objects.values_mut() {
            object.set_locked(true);
        }
    }
}
