//! Errors raised by project-type hooks.

use crate::core::{BoxError, State};
use thiserror::Error;

/// Why an event determiner could not pick the next event.
#[derive(Debug, Error)]
pub enum DeterminerError {
    #[error(
        "no branch at state '{state}' for value '{value}' (expected one of: {})",
        .expected.join(", ")
    )]
    UnmatchedBranch {
        state: State,
        value: String,
        expected: Vec<String>,
    },

    /// The project data is not yet in the shape needed to decide.
    #[error("{0}")]
    Undecided(String),

    #[error("{0}")]
    Failed(#[source] BoxError),
}

impl DeterminerError {
    pub fn undecided(reason: impl Into<String>) -> Self {
        Self::Undecided(reason.into())
    }

    /// True when a branch discriminator produced an unconfigured value.
    pub fn is_unmatched_branch(&self) -> bool {
        matches!(self, Self::UnmatchedBranch { .. })
    }
}

/// Errors raised while creating a new project from its type.
#[derive(Debug, Error)]
pub enum InitializeError {
    #[error("initial inputs reference unknown phase '{phase}'")]
    UnknownPhase { phase: String },

    #[error("initializer for project '{project}' failed")]
    Hook {
        project: String,
        #[source]
        source: BoxError,
    },
}
