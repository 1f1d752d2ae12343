use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::entity::BehaviorLogic;
use crate::lifecycle::{Stage, StageProcess, Tick};
use crate::scene::SceneReference;

fn blocking() -> bool {
    true
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    object: Uuid,
    from: [f32; 3],
    to: [f32; 3],
    start: Duration,
}

fn lerp(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    [0, 1, 2].map(|axis| from[axis] + (to[axis] - from[axis]) * t)
}

/// Moves the target object onto the destination object's position over `duration`
/// seconds, linearly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveObjectBehavior {
    pub target: SceneReference,
    pub destination: SceneReference,
    pub duration: f32,
    #[serde(default = "blocking")]
    pub is_blocking: bool,
    #[serde(skip)]
    motion: Option<Motion>,
}

impl MoveObjectBehavior {
    pub fn new(target: SceneReference, destination: SceneReference, duration: f32) -> Self {
        Self {
            target,
            destination,
            duration,
            is_blocking: true,
            motion: None,
        }
    }

    fn plan(&self, ctx: &ProcessContext) -> Option<Motion> {
        let scene = ctx.scene();
        let object = scene.resolve(&self.target).next()?;
        let destination = scene.resolve(&self.destination).next()?;
        Some(Motion {
            object: object.id(),
            from: object.position(),
            to: destination.position(),
            start: ctx.now(),
        })
    }

    fn place(ctx: &mut ProcessContext, object: Uuid, position: [f32; 3]) {
        if let Some(object) = ctx.scene_mut().get_mut(object) {
            object.set_position(position);
        }
    }
}

impl StageProcess for MoveObjectBehavior {
    fn on_start(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage != Stage::Activating {
            return;
        }
        self.motion = self.plan(ctx);
        if self.motion.is_none() {
            warn!("move object: target or destination not found in scene");
        }
    }

    fn on_update(&mut self, stage: Stage, ctx: &mut ProcessContext) -> Tick {
        let (Stage::Activating, Some(motion)) = (stage, self.motion) else {
            return Tick::Done;
        };

        let elapsed = ctx.now().saturating_sub(motion.start).as_secs_f32();
        let t = if self.duration > 0.0 {
            (elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        Self::place(ctx, motion.object, lerp(motion.from, motion.to, t));

        if t < 1.0 {
            Tick::Pending
        } else {
            Tick::Done
        }
    }

    fn on_end(&mut self, stage: Stage, _ctx: &mut ProcessContext) {
        if stage == Stage::Activating {
            self.motion = None;
        }
    }

    fn on_fast_forward(&mut self, stage: Stage, ctx: &mut ProcessContext) {
        if stage != Stage::Activating {
            return;
        }
        if let Some(motion) = self.motion.take() {
            Self::place(ctx, motion.object, motion.to);
        }
    }
}

impl BehaviorLogic for MoveObjectBehavior {
    const TYPE_NAME: &'static str = "move_object";

    fn is_blocking(&self) -> bool {
        self.is_blocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BehaviorEntity, Entity};
    use crate::lifecycle;
    use crate::scene::{SceneObject, SceneObjectRegistry};

    fn scene() -> (ProcessContext, Uuid, Uuid) {
        let mut scene = SceneObjectRegistry::new();
        let cube = scene.insert(SceneObject::new("cube"));
        let marker = scene.insert(SceneObject::new("marker").with_position([4.0, 0.0, -2.0]));
        (ProcessContext::new(scene), cube, marker)
    }

    fn position(ctx: &ProcessContext, id: Uuid) -> [f32; 3] {
        ctx.scene().get(id).unwrap().position()
    }

    #[test]
    fn interpolates_over_duration() {
        let (mut ctx, cube, marker) = scene();
        let logic = MoveObjectBehavior::new(
            SceneReference::object(cube),
            SceneReference::object(marker),
            2.0,
        );
        let mut behavior = BehaviorEntity::new("move", logic);
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();

        ctx.advance(Duration::from_secs(1));
        lifecycle::update(&mut behavior, &mut ctx);
        assert_eq!(position(&ctx, cube), [2.0, 0.0, -1.0]);
        assert_eq!(behavior.stage(), Stage::Activating);

        ctx.advance(Duration::from_secs(1));
        lifecycle::update(&mut behavior, &mut ctx);
        assert_eq!(position(&ctx, cube), [4.0, 0.0, -2.0]);
        assert_eq!(behavior.stage(), Stage::Active);
    }

    #[test]
    fn fast_forward_snaps_to_destination() {
        let (mut ctx, cube, marker) = scene();
        let logic = MoveObjectBehavior::new(
            SceneReference::object(cube),
            SceneReference::object(marker),
            30.0,
        );
        let mut behavior = BehaviorEntity::new("move", logic);
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();
        lifecycle::mark_to_fast_forward(&mut behavior, &mut ctx);

        assert_eq!(position(&ctx, cube), [4.0, 0.0, -2.0]);
        assert_eq!(behavior.stage(), Stage::Active);
    }

    #[test]
    fn missing_target_does_not_block() {
        let mut ctx = ProcessContext::default();
        let logic =
            MoveObjectBehavior::new(SceneReference::default(), SceneReference::default(), 5.0);
        let mut behavior = BehaviorEntity::new("move", logic);
        lifecycle::activate(&mut behavior, &mut ctx).unwrap();
        lifecycle::update(&mut behavior, &mut ctx);
        assert_eq!(behavior.stage(), Stage::Active);
    }
}
