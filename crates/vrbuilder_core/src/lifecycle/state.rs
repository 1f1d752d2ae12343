use serde::{Deserialize, Serialize};

/// Life cycle stage of an entity.
///
/// Stable (rest) stages:
/// - Inactive, Active
///
/// Transient stages, resolved by ticking:
/// - Activating, Deactivating, Aborting
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Stage {
    // Stable
    Inactive,
    Active,

    // Transient
    Activating,
    Deactivating,
    Aborting,
}

/// Internal, compact IDs used for error payloads.
impl Stage {
    pub const fn id(self) -> u8 {
        match self {
            Stage::Inactive => 0,
            Stage::Active => 1,
            Stage::Activating => 10,
            Stage::Deactivating => 11,
            Stage::Aborting => 12,
        }
    }

    /// True for rest stages an entity may stay in indefinitely.
    pub const fn is_stable(self) -> bool {
        matches!(self, Stage::Inactive | Stage::Active)
    }

    /// True for stages that must resolve after some number of ticks.
    pub const fn is_transient(self) -> bool {
        !self.is_stable()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Inactive => "Inactive",
            Stage::Active => "Active",
            Stage::Activating => "Activating",
            Stage::Deactivating => "Deactivating",
            Stage::Aborting => "Aborting",
        }
    }

    /// Bit used by fast-forward request sets.
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Stage::Inactive => 1 << 0,
            Stage::Active => 1 << 1,
            Stage::Activating => 1 << 2,
            Stage::Deactivating => 1 << 3,
            Stage::Aborting => 1 << 4,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical list of all stages (stable + transient).
pub const ALL_STAGES: [Stage; 5] = [
    Stage::Inactive,
    Stage::Active,
    Stage::Activating,
    Stage::Deactivating,
    Stage::Aborting,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_inactive_and_active_are_stable() {
        let stable: Vec<_> = ALL_STAGES.iter().filter(|s| s.is_stable()).collect();
        assert_eq!(stable, vec![&Stage::Inactive, &Stage::Active]);
        assert!(Stage::Aborting.is_transient());
    }

    #[test]
    fn stage_bits_are_distinct() {
        let mut seen = 0u8;
        for stage in ALL_STAGES {
            assert_eq!(seen & stage.bit(), 0);
            seen |= stage.bit();
        }
    }
}
