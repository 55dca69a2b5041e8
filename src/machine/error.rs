//! Errors raised while building or firing a machine.

use crate::core::{BoxError, Event, State};
use thiserror::Error;

/// Errors that can occur when firing an event.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("no transition for event '{event}' from state '{state}'")]
    NoTransition { state: State, event: Event },

    #[error("cannot fire event '{event}' from state '{state}'{}", blocked_reason(.description))]
    GuardBlocked {
        state: State,
        event: Event,
        description: Option<String>,
    },

    #[error("exit action of state '{state}' failed on event '{event}'")]
    ExitActionFailed {
        state: State,
        event: Event,
        #[source]
        source: BoxError,
    },

    #[error("entry action of state '{state}' failed on event '{event}'")]
    EntryActionFailed {
        state: State,
        event: Event,
        #[source]
        source: BoxError,
    },
}

impl MachineError {
    /// True when the transition exists but its guard is not satisfied.
    pub fn is_guard_blocked(&self) -> bool {
        matches!(self, Self::GuardBlocked { .. })
    }

    /// True when an entry or exit action failed.
    pub fn is_action_failure(&self) -> bool {
        matches!(
            self,
            Self::ExitActionFailed { .. } | Self::EntryActionFailed { .. }
        )
    }
}

pub(crate) fn blocked_reason(description: &Option<String>) -> String {
    match description {
        Some(description) => format!(": guard not satisfied ({description})"),
        None => ": guard not satisfied".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_blocked_message_includes_description() {
        let err = MachineError::GuardBlocked {
            state: State::from("Planning"),
            event: Event::from("approve"),
            description: Some("task list approved".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "cannot fire event 'approve' from state 'Planning': guard not satisfied (task list approved)"
        );
        assert!(err.is_guard_blocked());
    }

    #[test]
    fn action_failure_keeps_source() {
        use std::error::Error;

        let err = MachineError::EntryActionFailed {
            state: State::from("Review"),
            event: Event::from("submit"),
            source: "artifact missing".into(),
        };

        assert!(err.is_action_failure());
        assert_eq!(err.source().unwrap().to_string(), "artifact missing");
    }
}
