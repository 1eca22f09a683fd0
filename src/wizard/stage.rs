//! Wizard stage machine — tracks how far qualification has progressed.

use serde::{Deserialize, Serialize};

/// The stages of the qualification dialogue.
///
/// Progresses linearly: Collecting → Ready → HandedOff. `Ready` exists only
/// for the instant between the provider judging the record complete and the
/// handoff finishing (persistence + mode flip); it is never observed across
/// turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStage {
    Collecting,
    Ready,
    HandedOff,
}

impl WizardStage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStage) -> bool {
        use WizardStage::*;
        matches!((self, target), (Collecting, Ready) | (Ready, HandedOff))
    }

    /// Whether this stage is terminal (qualification is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::HandedOff)
    }
}

impl Default for WizardStage {
    fn default() -> Self {
        Self::Collecting
    }
}

impl std::fmt::Display for WizardStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::Ready => "ready",
            Self::HandedOff => "handed_off",
        };
        write!(f, "{s}")
    }
}
