//! Modes decide which optional behavior and condition types take part in a run.
//!
//! An excluded entity is not removed from the process: it is fast-forwarded as soon
//! as it activates, so every stage invariant still holds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};

pub const DEFAULT_MODE_NAME: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeRule {
    #[default]
    AllowAll,
    Whitelist(BTreeSet<String>),
    Blacklist(BTreeSet<String>),
}

impl TypeRule {
    pub fn allows(&self, type_name: &str) -> bool {
        match self {
            TypeRule::AllowAll => true,
            TypeRule::Whitelist(types) => types.contains(type_name),
            TypeRule::Blacklist(types) => !types.contains(type_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    #[serde(default)]
    pub rule: TypeRule,
}

impl Mode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule: TypeRule::AllowAll,
        }
    }

    pub fn with_whitelist<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule = TypeRule::Whitelist(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_blacklist<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule = TypeRule::Blacklist(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn allows(&self, type_name: &str) -> bool {
        self.rule.allows(type_name)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::new(DEFAULT_MODE_NAME)
    }
}

/// The set of modes a process can run in, plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeHandler {
    modes: Vec<Mode>,
    current: usize,
}

impl ModeHandler {
    /// An empty list falls back to the default mode.
    pub fn new(modes: Vec<Mode>) -> Self {
        let modes = if modes.is_empty() {
            vec![Mode::default()]
        } else {
            modes
        };
        Self { modes, current: 0 }
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn current(&self) -> &Mode {
        &self.modes[self.current]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modes.iter().any(|mode| mode.name == name)
    }

    /// Add `mode`, replacing a mode of the same name. The selection is kept.
    pub fn insert(&mut self, mode: Mode) {
        match self.modes.iter_mut().find(|known| known.name == mode.name) {
            Some(known) => *known = mode,
            None => self.modes.push(mode),
        }
    }

    pub fn select(&mut self, name: &str) -> Result<&Mode> {
        let index = self
            .modes
            .iter()
            .position(|mode| mode.name == name)
            .ok_or_else(|| {
                CoreError::warn()
                    .domain(Domain::Process)
                    .kind(ErrorKind::InvalidArgument)
                    .msg("unknown mode")
                    .payload(Payload::Context {
                        key: "mode",
                        value: name.to_string().into(),
                    })
                    .build()
            })?;
        self.current = index;
        Ok(&self.modes[index])
    }
}

impl Default for ModeHandler {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::behaviors::DelayBehavior;
    use crate::conditions::TimeoutCondition;
    use crate::entity::{BehaviorLogic, ConditionLogic};

    #[test]
    fn rules_filter_by_type_name() {
        let timeout = TimeoutCondition::TYPE_NAME;
        let delay = DelayBehavior::TYPE_NAME;

        let whitelist = Mode::new("w").with_whitelist([timeout]);
        assert!(whitelist.allows(timeout));
        assert!(!whitelist.allows(delay));

        let blacklist = Mode::new("b").with_blacklist([delay]);
        assert!(!blacklist.allows(delay));
        assert!(blacklist.allows(timeout));

        assert!(Mode::default().allows(delay));
    }

    #[test]
    fn insert_replaces_modes_by_name() {
        let mut handler = ModeHandler::default();
        handler.insert(Mode::new("exam").with_blacklist([DelayBehavior::TYPE_NAME]));
        handler.insert(Mode::new("exam"));

        assert_eq!(handler.modes().len(), 2);
        assert!(handler.contains("exam"));
        assert_eq!(handler.current().name, DEFAULT_MODE_NAME);
        assert_eq!(handler.select("exam").unwrap().rule, TypeRule::AllowAll);
    }

    #[test]
    fn handler_selects_by_name() {
        let mut handler = ModeHandler::new(vec![Mode::new("a"), Mode::new("b")]);
        assert_eq!(handler.current().name, "a");
        assert_eq!(handler.select("b").unwrap().name, "b");
        assert_eq!(
            handler.select("c").unwrap_err().kind,
            ErrorKind::InvalidArgument
        );
        assert_eq!(handler.current().name, "b");
    }

    #[test]
    fn empty_handler_has_default_mode() {
        assert_eq!(ModeHandler::default().current().name, DEFAULT_MODE_NAME);
    }
}
