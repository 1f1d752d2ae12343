//! Type-name -> factory table for behaviors and conditions.
//!
//! Deserialization only knows type names; everything it can build has to be
//! registered here first.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::behaviors::{
    DelayBehavior, ExecuteChaptersBehavior, MoveObjectBehavior, SetObjectLockedBehavior,
};
use crate::conditions::{
    GrabbedCondition, MomentaryPressedCondition, ReleasedCondition, SnappedCondition,
    TeleportCondition, TimeoutCondition, TouchedCondition, UsedCondition, ValueInRangeCondition,
};
use crate::entity::{
    Behavior, BehaviorEntity, BehaviorLogic, Condition, ConditionEntity, ConditionLogic,
};
use crate::error::{CoreError, Result};

pub type ConditionFactory = fn(&EntityRegistry, &str, Value) -> Result<Box<dyn Condition>>;
pub type BehaviorFactory = fn(&EntityRegistry, &str, Value) -> Result<Box<dyn Behavior>>;

fn build_condition<C: ConditionLogic>(
    _registry: &EntityRegistry,
    name: &str,
    data: Value,
) -> Result<Box<dyn Condition>> {
    let logic: C = serde_json::from_value(data)?;
    Ok(Box::new(ConditionEntity::new(name, logic)))
}

fn build_behavior<B: BehaviorLogic>(
    _registry: &EntityRegistry,
    name: &str,
    data: Value,
) -> Result<Box<dyn Behavior>> {
    let logic: B = serde_json::from_value(data)?;
    Ok(Box::new(BehaviorEntity::new(name, logic)))
}

#[derive(Clone, Default)]
pub struct EntityRegistry {
    conditions: BTreeMap<String, ConditionFactory>,
    behaviors: BTreeMap<String, BehaviorFactory>,
}

impl EntityRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in behavior and condition.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_condition::<TimeoutCondition>();
        registry.register_condition::<GrabbedCondition>();
        registry.register_condition::<ReleasedCondition>();
        registry.register_condition::<TouchedCondition>();
        registry.register_condition::<UsedCondition>();
        registry.register_condition::<SnappedCondition>();
        registry.register_condition::<TeleportCondition>();
        registry.register_condition::<ValueInRangeCondition>();
        registry.register_condition::<MomentaryPressedCondition>();

        registry.register_behavior::<DelayBehavior>();
        registry.register_behavior::<MoveObjectBehavior>();
        registry.register_behavior::<SetObjectLockedBehavior>();
        registry.register_behavior_factory(
            ExecuteChaptersBehavior::TYPE_NAME,
            ExecuteChaptersBehavior::from_data,
        );

        registry
    }

    pub fn register_condition<C: ConditionLogic>(&mut self) {
        self.register_condition_factory(C::TYPE_NAME, build_condition::<C>);
    }

    pub fn register_behavior<B: BehaviorLogic>(&mut self) {
        self.register_behavior_factory(B::TYPE_NAME, build_behavior::<B>);
    }

    /// Later registrations replace earlier ones with the same type name.
    pub fn register_condition_factory(
        &mut self,
        type_name: impl Into<String>,
        factory: ConditionFactory,
    ) {
        self.conditions.insert(type_name.into(), factory);
    }

    pub fn register_behavior_factory(
        &mut self,
        type_name: impl Into<String>,
        factory: BehaviorFactory,
    ) {
        self.behaviors.insert(type_name.into(), factory);
    }

    pub fn create_condition(
        &self,
        type_name: &str,
        name: &str,
        data: Value,
    ) -> Result<Box<dyn Condition>> {
        let factory = self
            .conditions
            .get(type_name)
            .ok_or_else(|| CoreError::unknown_type(type_name.to_string()))?;
        factory(self, name, data)
    }

    pub fn create_behavior(
        &self,
        type_name: &str,
        name: &str,
        data: Value,
    ) -> Result<Box<dyn Behavior>> {
        let factory = self
            .behaviors
            .get(type_name)
            .ok_or_else(|| CoreError::unknown_type(type_name.to_string()))?;
        factory(self, name, data)
    }

    pub fn condition_types(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn behavior_types(&self) -> impl Iterator<Item = &str> {
        self.behaviors.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .finish()
    }
}
