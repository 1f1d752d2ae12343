use anyhow::{bail, Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use vrbuilder_core::context::ProcessContext;
use vrbuilder_core::entity::{Entity, EntityKind};
use vrbuilder_core::mode::ModeHandler;
use vrbuilder_core::scene::SceneObjectRegistry;
use vrbuilder_core::serialization::{JsonProcessSerializer, ProcessSerializer};
use vrbuilder_process_runner::config::Config;
use vrbuilder_process_runner::modes::{load_modes, merge_requested};
use vrbuilder_process_runner::scene::load_scene;
use vrbuilder_runtime::error::log_core_error;
use vrbuilder_runtime::lifecycle::{ManagedTicker, ProcessRunner, RunnerEvent};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let Some(process_path) = config.process.as_deref() else {
        bail!("no process document given (use --process or VRBUILDER_PROCESS)");
    };
    let bytes = std::fs::read(process_path)
        .with_context(|| format!("read process {}", process_path.display()))?;
    let process = JsonProcessSerializer::default()
        .deserialize_process(&bytes)
        .inspect_err(log_core_error)
        .with_context(|| format!("load process {}", process_path.display()))?;

    let scene = match config.scene.as_deref() {
        Some(path) => load_scene(path)?,
        None => SceneObjectRegistry::new(),
    };
    info!(
        process = process.name(),
        chapters = process.chapters().len(),
        scene_objects = scene.len(),
        "process loaded"
    );

    let mut modes = match config.modes.as_deref() {
        Some(path) => load_modes(path)?,
        None => ModeHandler::default(),
    };
    let selected = merge_requested(&mut modes, config.mode());

    let mut runner = ProcessRunner::new(process, ProcessContext::new(scene));
    runner.set_modes(modes);
    if let Some(name) = selected {
        runner
            .select_mode(&name)
            .inspect_err(log_core_error)
            .with_context(|| format!("select mode {name}"))?;
    }
    let logger = tokio::spawn(log_events(runner.subscribe_stage_events()));

    runner.start().inspect_err(log_core_error)?;
    if config.fast_forward {
        runner.fast_forward();
    }

    let ticker = ManagedTicker::new(runner.pause_gate(), config.tick);
    let executed = ticker.drive(&mut runner, config.max_ticks).await;
    let finished = runner.is_finished();
    let elapsed = runner.context().now();

    // Dropping the runner closes the event channel and ends the logger.
    drop(runner);
    logger.await.context("event logger task")?;

    if !finished {
        bail!("process did not finish within {executed} ticks");
    }
    info!(ticks = executed, elapsed_ms = elapsed.as_millis() as u64, "done");
    Ok(())
}

async fn log_events(mut events: tokio::sync::broadcast::Receiver<RunnerEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => log_event(&event),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "stage event log fell behind"),
            Err(RecvError::Closed) => return,
        }
    }
}

fn log_event(event: &RunnerEvent) {
    let at_ms = event.at.as_millis() as u64;
    match event.kind {
        EntityKind::Process | EntityKind::Chapter | EntityKind::Step => info!(
            at_ms,
            kind = event.kind.label(),
            name = %event.name,
            from = %event.from,
            to = %event.to,
            "stage"
        ),
        _ => debug!(
            at_ms,
            kind = event.kind.label(),
            name = %event.name,
            from = %event.from,
            to = %event.to,
            "stage"
        ),
    }
}
