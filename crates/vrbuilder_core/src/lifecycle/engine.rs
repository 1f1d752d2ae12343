use tracing::debug;

use crate::context::ProcessContext;
use crate::entity::Entity;
use crate::error::{CoreError, Result};

use super::{Request, Stage, StageEvent};

/// Outcome of one tick of a stage process.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tick {
    /// Work remains; tick again next frame.
    Pending,
    /// The stage process is exhausted.
    Done,
}

/// Per-stage work of an entity.
///
/// For every stage an entity enters, the engine calls:
/// - `on_start` once, synchronously, when the stage is entered
/// - `on_update` once per tick until it returns `Tick::Done`
/// - `on_end` exactly once, on completion or when the stage is cut short
///
/// `on_fast_forward` is only invoked for stages marked to fast-forward. It must be
/// idempotent: it runs right before `on_update` on every tick the mark is pending.
pub trait StageProcess {
    fn on_start(&mut self, _stage: Stage, _ctx: &mut ProcessContext) {}

    fn on_update(&mut self, _stage: Stage, _ctx: &mut ProcessContext) -> Tick {
        Tick::Done
    }

    fn on_end(&mut self, _stage: Stage, _ctx: &mut ProcessContext) {}

    fn on_fast_forward(&mut self, _stage: Stage, _ctx: &mut ProcessContext) {}
}

/// Begin a life cycle request by moving from the current stage into the correct
/// **transient** stage.
///
/// This enforces:
/// - activation only from Inactive
/// - deactivation only from Active
/// - abort from any stage that is neither Inactive nor already Aborting
pub fn begin(current: Stage, via: Request) -> Result<Stage> {
    use Request::*;
    use Stage::*;

    let next = match (current, via) {
        (Inactive, Activate) => Activating,
        (Active, Deactivate) => Deactivating,
        (Activating | Active | Deactivating, Abort) => Aborting,

        _ => {
            return Err(CoreError::invalid_stage_request(current.id(), via.id()));
        }
    };

    Ok(next)
}

/// Rest stage a transient stage settles in once its process is exhausted.
pub fn finish(stage: Stage) -> Stage {
    match stage {
        Stage::Activating => Stage::Active,
        Stage::Deactivating | Stage::Aborting => Stage::Inactive,
        stable => stable,
    }
}

/// Requests a caller may issue from a given stage.
pub fn available_requests(stage: Stage) -> &'static [Request] {
    use Request::*;
    use Stage::*;

    match stage {
        Inactive => &[Activate],
        Active => &[Deactivate, Abort],
        Activating | Deactivating => &[Abort],
        // Abort on an aborting entity is accepted by `abort()` as a no-op.
        Aborting => &[],
    }
}

/// Inactive -> Activating. Starts the activating process.
pub fn activate<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) -> Result<()> {
    let next = begin(entity.stage(), Request::Activate)?;
    enter_stage(entity, next, ctx);
    settle(entity, ctx);
    Ok(())
}

/// Active -> Deactivating. A still-running active process is ended first.
pub fn deactivate<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) -> Result<()> {
    let current = entity.stage();
    let next = begin(current, Request::Deactivate)?;
    end_running_process(entity, current, ctx);
    enter_stage(entity, next, ctx);
    settle(entity, ctx);
    Ok(())
}

/// Activating/Active/Deactivating -> Aborting.
///
/// The interrupted stage still gets its `on_end`, unless its process already finished.
/// Aborting an entity that is already aborting is a no-op. The entity must keep
/// being ticked until it reports Inactive.
pub fn abort<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) -> Result<()> {
    let current = entity.stage();
    if current == Stage::Aborting {
        return Ok(());
    }

    let next = begin(current, Request::Abort)?;
    end_running_process(entity, current, ctx);
    enter_stage(entity, next, ctx);
    settle(entity, ctx);
    Ok(())
}

/// Advance the entity one tick: its own stage process first, then its children.
pub fn update<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) {
    if entity.life_cycle().is_process_running() {
        let stage = entity.stage();
        if entity.life_cycle().is_marked_to_fast_forward(stage) {
            entity.on_fast_forward(stage, ctx);
        }
        if entity.on_update(stage, ctx) == Tick::Done {
            complete_stage(entity, ctx);
            settle(entity, ctx);
        }
    }

    entity.update_children(ctx);
}

/// Mark activation, active work and deactivation for fast-forwarding.
///
/// Takes effect immediately for the current stage and on arrival for the others.
pub fn mark_to_fast_forward<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) {
    {
        let life_cycle = entity.life_cycle_mut();
        life_cycle.mark(Stage::Activating);
        life_cycle.mark(Stage::Active);
        life_cycle.mark(Stage::Deactivating);
    }
    settle(entity, ctx);
}

/// Mark a single stage for fast-forwarding.
///
/// If the entity is currently in `stage`, the stage collapses now; otherwise the
/// request waits until the stage is reached. Marking a stage whose process already
/// finished, or any stage of an inactive entity, does nothing.
pub fn mark_to_fast_forward_stage<E: Entity + ?Sized>(
    entity: &mut E,
    stage: Stage,
    ctx: &mut ProcessContext,
) {
    if entity.stage() == Stage::Inactive {
        return;
    }
    entity.life_cycle_mut().mark(stage);
    if entity.stage() == stage {
        settle(entity, ctx);
    }
}

/// Collapse consecutive stages that are marked to fast-forward.
///
/// Bounded: each round finishes one stage, and both Active (process exhausted) and
/// Inactive stop the chain.
fn settle<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) {
    loop {
        let stage = entity.stage();
        let life_cycle = entity.life_cycle();
        if !life_cycle.is_process_running() || !life_cycle.is_marked_to_fast_forward(stage) {
            return;
        }

        entity.on_fast_forward(stage, ctx);
        if entity.on_update(stage, ctx) != Tick::Done {
            return;
        }
        complete_stage(entity, ctx);
    }
}

fn complete_stage<E: Entity + ?Sized>(entity: &mut E, ctx: &mut ProcessContext) {
    let stage = entity.stage();
    entity.on_end(stage, ctx);
    entity.life_cycle_mut().set_process_running(false);

    let next = finish(stage);
    if next != stage {
        enter_stage(entity, next, ctx);
    }
}

fn end_running_process<E: Entity + ?Sized>(entity: &mut E, stage: Stage, ctx: &mut ProcessContext) {
    if entity.life_cycle().is_process_running() {
        entity.on_end(stage, ctx);
        entity.life_cycle_mut().set_process_running(false);
    }
}

fn enter_stage<E: Entity + ?Sized>(entity: &mut E, stage: Stage, ctx: &mut ProcessContext) {
    let from = entity.life_cycle_mut().enter(stage);

    debug!(
        kind = entity.kind().label(),
        name = entity.name(),
        from = from.label(),
        to = stage.label(),
        "stage changed"
    );
    ctx.record_event(StageEvent {
        kind: entity.kind(),
        name: entity.name().to_string(),
        from,
        to: stage,
    });

    if stage != Stage::Inactive {
        entity.on_start(stage, ctx);
    }
}
