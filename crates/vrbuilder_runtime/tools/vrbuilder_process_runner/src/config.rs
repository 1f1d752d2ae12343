use std::env;
use std::path::PathBuf;
use std::time::Duration;

use vrbuilder_core::mode::Mode;

pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_LOG: &str = "info";

pub struct Config {
    pub process: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    /// JSON list of known modes.
    pub modes: Option<PathBuf>,
    pub tick: Duration,
    /// `name` or `name:type,type` (the listed types are skipped).
    pub mode: Option<String>,
    pub fast_forward: bool,
    pub max_ticks: Option<u64>,
    pub log: String,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut process = env::var("VRBUILDER_PROCESS").ok().map(PathBuf::from);
        let mut scene = env::var("VRBUILDER_SCENE").ok().map(PathBuf::from);
        let mut modes = env::var("VRBUILDER_MODES").ok().map(PathBuf::from);
        let mut tick_ms = env::var("VRBUILDER_TICK_MS")
            .ok()
            .and_then(|value| parse_u64(&value))
            .unwrap_or(DEFAULT_TICK_MS);
        let mut mode = env::var("VRBUILDER_MODE").ok();
        let mut fast_forward = env::var("VRBUILDER_FAST_FORWARD")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(false);
        let mut max_ticks = env::var("VRBUILDER_MAX_TICKS")
            .ok()
            .and_then(|value| parse_u64(&value));
        let mut log = env::var("VRBUILDER_LOG").unwrap_or_else(|_| DEFAULT_LOG.to_string());

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--process" => {
                    if let Some(value) = args.next() {
                        process = Some(PathBuf::from(value.as_ref()));
                    }
                }
                "--scene" => {
                    if let Some(value) = args.next() {
                        scene = Some(PathBuf::from(value.as_ref()));
                    }
                }
                "--modes" => {
                    if let Some(value) = args.next() {
                        modes = Some(PathBuf::from(value.as_ref()));
                    }
                }
                "--tick-ms" => {
                    if let Some(value) = args.next().and_then(|v| parse_u64(v.as_ref())) {
                        tick_ms = value;
                    }
                }
                "--mode" => {
                    if let Some(value) = args.next() {
                        mode = Some(value.as_ref().to_string());
                    }
                }
                "--max-ticks" => {
                    if let Some(value) = args.next().and_then(|v| parse_u64(v.as_ref())) {
                        max_ticks = Some(value);
                    }
                }
                "--log" => {
                    if let Some(value) = args.next() {
                        log = value.as_ref().to_string();
                    }
                }
                "--fast-forward" => {
                    fast_forward = true;
                }
                _ if arg.starts_with("--process=") => {
                    process = Some(PathBuf::from(&arg["--process=".len()..]));
                }
                _ if arg.starts_with("--scene=") => {
                    scene = Some(PathBuf::from(&arg["--scene=".len()..]));
                }
                _ if arg.starts_with("--modes=") => {
                    modes = Some(PathBuf::from(&arg["--modes=".len()..]));
                }
                _ if arg.starts_with("--tick-ms=") => {
                    if let Some(value) = parse_u64(&arg["--tick-ms=".len()..]) {
                        tick_ms = value;
                    }
                }
                _ if arg.starts_with("--mode=") => {
                    mode = Some(arg["--mode=".len()..].to_string());
                }
                _ if arg.starts_with("--max-ticks=") => {
                    if let Some(value) = parse_u64(&arg["--max-ticks=".len()..]) {
                        max_ticks = Some(value);
                    }
                }
                _ if arg.starts_with("--log=") => {
                    log = arg["--log=".len()..].to_string();
                }
                _ => {}
            }
        }

        Self {
            process,
            scene,
            modes,
            tick: Duration::from_millis(tick_ms.max(1)),
            mode,
            fast_forward,
            max_ticks,
            log,
        }
    }

    /// The mode named on the command line, if any. Without a type list it may
    /// also name a mode from the modes file.
    pub fn mode(&self) -> Option<Mode> {
        let value = self.mode.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        let Some((name, skipped)) = value.split_once(':') else {
            return Some(Mode::new(value));
        };
        let skipped: Vec<&str> = skipped
            .split(',')
            .map(str::trim)
            .filter(|type_name| !type_name.is_empty())
            .collect();
        Some(Mode::new(name.trim()).with_blacklist(skipped))
    }
}

fn print_usage() {
    println!(
        "vrbuilder_process_runner --process <file.json> [--scene <file.json>] \
         [--modes <file.json>] [--mode <name>[:type,type]] [--tick-ms <ms>] \
         [--fast-forward] [--max-ticks <n>] [--log <filter>]"
    );
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
