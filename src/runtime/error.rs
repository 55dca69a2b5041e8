use crate::config::DeterminerError;
use crate::core::{Event, State};
use crate::machine::MachineError;
use thiserror::Error;

/// Why `Project::advance` could not move the project forward.
#[derive(Debug, Error)]
pub enum AdvanceError {
    /// The project type registers no determiner for the current state.
    #[error("no event determiner for state '{state}'")]
    NoDeterminer { state: State },

    #[error("cannot determine next event from state '{state}': {source}")]
    Undetermined {
        state: State,
        #[source]
        source: DeterminerError,
    },

    /// The transition exists but its guard is not satisfied.
    #[error("cannot fire event '{event}' from state '{state}'{}", guard_suffix(.guard))]
    Blocked {
        state: State,
        event: Event,
        guard: Option<String>,
    },

    #[error(transparent)]
    Transition(#[from] MachineError),
}

/// Coarse classification of an [`AdvanceError`], for callers that render
/// guidance instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceErrorKind {
    /// Mistake in the project type definition.
    Configuration,
    /// The project data does not yet allow a decision.
    Indeterminate,
    /// Preconditions unmet; the user can fix the data and retry.
    Blocked,
    /// An entry or exit action failed.
    Action,
}

impl AdvanceError {
    pub fn kind(&self) -> AdvanceErrorKind {
        match self {
            Self::NoDeterminer { .. } => AdvanceErrorKind::Configuration,
            Self::Undetermined { source, .. } if source.is_unmatched_branch() => {
                AdvanceErrorKind::Configuration
            }
            Self::Undetermined { .. } => AdvanceErrorKind::Indeterminate,
            Self::Blocked { .. } => AdvanceErrorKind::Blocked,
            Self::Transition(MachineError::NoTransition { .. }) => AdvanceErrorKind::Configuration,
            Self::Transition(MachineError::GuardBlocked { .. }) => AdvanceErrorKind::Blocked,
            Self::Transition(_) => AdvanceErrorKind::Action,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.kind() == AdvanceErrorKind::Blocked
    }
}

fn guard_suffix(guard: &Option<String>) -> String {
    guard
        .as_ref()
        .map(|g| format!(" (requires: {g})"))
        .unwrap_or_default()
}
