use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use vrbuilder_process_runner::config::{Config, DEFAULT_TICK_MS};

const VARS: [&str; 8] = [
    "VRBUILDER_PROCESS",
    "VRBUILDER_SCENE",
    "VRBUILDER_MODES",
    "VRBUILDER_TICK_MS",
    "VRBUILDER_MODE",
    "VRBUILDER_FAST_FORWARD",
    "VRBUILDER_MAX_TICKS",
    "VRBUILDER_LOG",
];

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let guard = LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    for var in VARS {
        env::remove_var(var);
    }
    guard
}

#[test]
fn defaults_without_args_or_env() {
    let _guard = env_lock();

    let config = Config::from_args_iter(["bin"]);
    assert!(config.process.is_none());
    assert!(config.scene.is_none());
    assert!(config.modes.is_none());
    assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
    assert!(!config.fast_forward);
    assert!(config.max_ticks.is_none());
    assert_eq!(config.log, "info");
    assert!(config.mode().is_none());
}

#[test]
fn both_flag_forms_are_accepted() {
    let _guard = env_lock();

    let config = Config::from_args_iter([
        "bin",
        "--process",
        "process.json",
        "--scene=scene.json",
        "--modes",
        "modes.json",
        "--tick-ms=20",
        "--max-ticks",
        "500",
        "--fast-forward",
    ]);
    assert_eq!(config.process.as_deref(), Some(Path::new("process.json")));
    assert_eq!(config.scene.as_deref(), Some(Path::new("scene.json")));
    assert_eq!(config.modes.as_deref(), Some(Path::new("modes.json")));
    assert_eq!(config.tick, Duration::from_millis(20));
    assert_eq!(config.max_ticks, Some(500));
    assert!(config.fast_forward);
}

#[test]
fn args_override_env() {
    let _guard = env_lock();
    env::set_var("VRBUILDER_PROCESS", "from_env.json");
    env::set_var("VRBUILDER_TICK_MS", "50");
    env::set_var("VRBUILDER_FAST_FORWARD", "yes");

    let config = Config::from_args_iter(["bin", "--process=from_args.json"]);
    assert_eq!(config.process.as_deref(), Some(Path::new("from_args.json")));
    assert_eq!(config.tick, Duration::from_millis(50));
    assert!(config.fast_forward);

    env::remove_var("VRBUILDER_PROCESS");
    env::remove_var("VRBUILDER_TICK_MS");
    env::remove_var("VRBUILDER_FAST_FORWARD");
}

#[test]
fn malformed_numbers_fall_back_and_zero_tick_is_clamped() {
    let _guard = env_lock();
    env::set_var("VRBUILDER_MAX_TICKS", "lots");

    let config = Config::from_args_iter(["bin", "--tick-ms", "0"]);
    assert_eq!(config.tick, Duration::from_millis(1));
    assert!(config.max_ticks.is_none());

    env::remove_var("VRBUILDER_MAX_TICKS");
}

#[test]
fn mode_flag_lists_skipped_types() {
    let _guard = env_lock();
    env::set_var("VRBUILDER_MODE", "quick: delay, move_object");

    let mode = Config::from_args_iter(["bin"]).mode().expect("mode");
    assert_eq!(mode.name, "quick");
    assert!(!mode.allows("delay"));
    assert!(!mode.allows("move_object"));
    assert!(mode.allows("timeout"));

    let plain = Config::from_args_iter(["bin", "--mode", "guided"])
        .mode()
        .expect("mode");
    assert_eq!(plain.name, "guided");
    assert!(plain.allows("delay"));

    env::remove_var("VRBUILDER_MODE");
}
