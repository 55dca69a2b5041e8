//! Validation of a project against its type.
//!
//! Every check runs and every violation is reported, so a user can fix a
//! broken project in one pass.

use super::ProjectTypeConfig;
use crate::core::State;
use crate::project::ProjectState;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

type Check = Validation<(), NonEmptyVec<ProjectViolation>>;

/// One way a project disagrees with its type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectViolation {
    #[error("project type is '{found}', expected '{expected}'")]
    TypeMismatch { expected: String, found: String },

    #[error("phase '{phase}' is not declared by the project type")]
    UnknownPhase { phase: String },

    #[error("phase '{phase}' does not accept input artifacts of type '{artifact_type}'")]
    DisallowedInput {
        phase: String,
        artifact_type: String,
    },

    #[error("phase '{phase}' does not accept output artifacts of type '{artifact_type}'")]
    DisallowedOutput {
        phase: String,
        artifact_type: String,
    },

    #[error("phase '{phase}' does not support tasks")]
    TasksNotSupported { phase: String },

    #[error("current state '{state}' is not part of the project type")]
    UnknownState { state: State },

    #[error("{0}")]
    Custom(String),
}

/// A project failed validation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("project '{project}' is invalid: {}", join(.violations))]
pub struct ProjectValidationError {
    pub project: String,
    pub violations: Vec<ProjectViolation>,
}

fn join(violations: &[ProjectViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProjectTypeConfig {
    /// Check `project` against this type, accumulating all violations.
    pub fn validate(&self, project: &ProjectState) -> Result<(), ProjectValidationError> {
        let mut checks: Vec<Check> = Vec::new();

        if project.project_type != self.name {
            checks.push(Validation::fail(ProjectViolation::TypeMismatch {
                expected: self.name.clone(),
                found: project.project_type.clone(),
            }));
        }

        if !self.states().contains(project.current_state()) {
            checks.push(Validation::fail(ProjectViolation::UnknownState {
                state: project.current_state().clone(),
            }));
        }

        for (name, phase_state) in &project.phases {
            let Some(phase) = self.phase(name) else {
                checks.push(Validation::fail(ProjectViolation::UnknownPhase {
                    phase: name.clone(),
                }));
                continue;
            };

            for artifact in &phase_state.inputs {
                if !phase.allows_input(&artifact.artifact_type) {
                    checks.push(Validation::fail(ProjectViolation::DisallowedInput {
                        phase: name.clone(),
                        artifact_type: artifact.artifact_type.clone(),
                    }));
                }
            }
            for artifact in &phase_state.outputs {
                if !phase.allows_output(&artifact.artifact_type) {
                    checks.push(Validation::fail(ProjectViolation::DisallowedOutput {
                        phase: name.clone(),
                        artifact_type: artifact.artifact_type.clone(),
                    }));
                }
            }
            if !phase.supports_tasks() && !phase_state.tasks.is_empty() {
                checks.push(Validation::fail(ProjectViolation::TasksNotSupported {
                    phase: name.clone(),
                }));
            }
        }

        if let Some(validator) = &self.validator {
            if let Err(err) = validator(project) {
                checks.push(Validation::fail(ProjectViolation::Custom(err.to_string())));
            }
        }

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => Ok(()),
            Validation::Failure(errors) => Err(ProjectValidationError {
                project: project.name.clone(),
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}
