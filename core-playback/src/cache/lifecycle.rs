//! Cache worker lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the cache worker.
///
/// ```text
/// Uninstalled ──> Installing ──> Installed ──> Activating ──> Active
///      ^              │               ^             │
///      └── failure ───┘               └── failure ──┘
/// ```
///
/// There is no way back to `Uninstalled` from `Active`; a new generation is
/// a new worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerPhase {
    #[default]
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Active,
}

impl WorkerPhase {
    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: WorkerPhase) -> bool {
        use WorkerPhase::*;
        matches!(
            (self, next),
            (Uninstalled, Installing)
                | (Installed, Installing)
                | (Installing, Installed)
                | (Installing, Uninstalled)
                | (Installed, Activating)
                | (Activating, Active)
                | (Activating, Installed)
        )
    }

    /// Only an active worker serves requests from the cache.
    pub fn is_serving(self) -> bool {
        self == WorkerPhase::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerPhase::Uninstalled => "uninstalled",
            WorkerPhase::Installing => "installing",
            WorkerPhase::Installed => "installed",
            WorkerPhase::Activating => "activating",
            WorkerPhase::Active => "active",
        }
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        use WorkerPhase::*;
        let path = [Uninstalled, Installing, Installed, Activating, Active];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(Active.is_serving());
        assert!(!Installed.is_serving());
    }

    #[test]
    fn test_illegal_transitions() {
        use WorkerPhase::*;
        assert!(!Uninstalled.can_transition_to(Activating));
        assert!(!Active.can_transition_to(Uninstalled));
        assert!(!Active.can_transition_to(Installing));
        assert!(!Installing.can_transition_to(Installing));
    }
}
