//! Build errors shared by the machine and project-type builders.

use crate::core::{Event, State};
use thiserror::Error;

/// Errors that can occur when building machines and project types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("ambiguous transition: event '{event}' leaves state '{from}' more than once")]
    AmbiguousTransition { from: State, event: Event },

    #[error("invalid project type '{name}': {}", join_violations(.violations))]
    InvalidConfig {
        name: String,
        violations: Vec<ConfigViolation>,
    },
}

/// A single problem found while validating a project-type definition.
///
/// All violations are collected before `build()` returns, so a broken
/// definition reports everything wrong with it at once.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("initial state not specified")]
    MissingInitialState,

    #[error("phase '{phase}' declared more than once")]
    DuplicatePhase { phase: String },

    #[error("phase '{phase}' has no start state")]
    MissingPhaseStartState { phase: String },

    #[error("phase '{phase}' has no end state")]
    MissingPhaseEndState { phase: String },

    #[error("event '{event}' leaves state '{from}' more than once")]
    AmbiguousTransition { from: State, event: Event },

    #[error("transition '{from}' --{event}--> marks unknown phase '{phase}' failed")]
    UnknownFailedPhase {
        from: State,
        event: Event,
        phase: String,
    },

    #[error("branch at state '{state}' has no discriminator")]
    MissingDiscriminator { state: State },

    #[error("branch at state '{state}' has no paths")]
    EmptyBranch { state: State },

    #[error("state '{state}' has more than one branch")]
    DuplicateBranch { state: State },

    #[error("state '{state}' has both a branch and an explicit event determiner")]
    ConflictingDeterminer { state: State },
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
