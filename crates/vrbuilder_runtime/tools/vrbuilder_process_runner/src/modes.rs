//! Mode documents: a JSON list of modes the process may run in.

use std::path::Path;

use anyhow::{Context, Result};
use vrbuilder_core::mode::{Mode, ModeHandler, TypeRule};

pub fn modes_from_slice(bytes: &[u8]) -> Result<ModeHandler> {
    let modes: Vec<Mode> = serde_json::from_slice(bytes).context("parse mode document")?;
    Ok(ModeHandler::new(modes))
}

pub fn load_modes(path: &Path) -> Result<ModeHandler> {
    let bytes = std::fs::read(path).with_context(|| format!("read modes {}", path.display()))?;
    modes_from_slice(&bytes)
}

/// Merge the command line mode into `modes` and return the name to select.
///
/// A bare name picks a known mode; a name with a type list, or an unknown name,
/// adds (or replaces) a mode first.
pub fn merge_requested(modes: &mut ModeHandler, requested: Option<Mode>) -> Option<String> {
    let requested = requested?;
    let name = requested.name.clone();
    if requested.rule != TypeRule::AllowAll || !modes.contains(&name) {
        modes.insert(requested);
    }
    Some(name)
}
