//! Phaseflow: declarative project-type state machines
//!
//! A project type is declared once as a [`ProjectTypeConfig`]: its phases,
//! the transitions between states, guards and actions written against the
//! project data, per-state prompts, and the determiners that pick the next
//! event. Branching decision points are declared with one discriminator and
//! a list of `when` paths; the builder expands them into ordinary
//! transitions plus one routing determiner.
//!
//! At runtime a [`Project`] binds persisted [`ProjectState`] to a machine
//! built from its type. [`Project::advance`] determines the next event,
//! checks its guard, fires it and keeps coarse phase statuses in sync.
//!
//! # Core Concepts
//!
//! - **Machine**: a generic FSM over an explicit context ([`Machine`])
//! - **Config**: immutable description of a project type ([`ProjectTypeConfig`])
//! - **Project**: data plus bound machine ([`Project`])
//! - **Registry**: explicit type-name lookup used when loading ([`Registry`])
//!
//! # Example
//!
//! ```rust
//! use phaseflow::config::{
//!     branch_on, when, with_end_state, with_failed_phase, with_start_state, InitialInputs,
//!     ProjectTypeConfigBuilder,
//! };
//! use phaseflow::{events, states, PhaseStatus, ProjectState, Registry};
//!
//! states! {
//!     IMPLEMENTING = "Implementing";
//!     REVIEWING = "Reviewing";
//!     DONE = "Done";
//! }
//! events! {
//!     SUBMIT = "submit";
//!     PASS = "review_pass";
//!     FAIL = "review_fail";
//! }
//!
//! let config = ProjectTypeConfigBuilder::new("standard")
//!     .initial_state(IMPLEMENTING)
//!     .add_phase("implementation", [with_start_state(IMPLEMENTING), with_end_state(IMPLEMENTING)])
//!     .add_phase("review", [with_start_state(REVIEWING), with_end_state(REVIEWING)])
//!     .add_transition(IMPLEMENTING, REVIEWING, SUBMIT, [])
//!     .add_branch(
//!         REVIEWING,
//!         [
//!             branch_on(|p: &ProjectState| p.metadata_str("verdict").unwrap_or_default().to_string()),
//!             when("pass", PASS, DONE, []),
//!             when("fail", FAIL, IMPLEMENTING, [with_failed_phase("review")]),
//!         ],
//!     )
//!     .on_advance(IMPLEMENTING, |_| Ok(SUBMIT))
//!     .build()?;
//!
//! let mut registry = Registry::new();
//! registry.register(config)?;
//!
//! let mut project = registry.create("standard", "auth", InitialInputs::new())?;
//! project.advance()?;
//! project.project_mut().metadata.insert("verdict".into(), "fail".into());
//! project.advance()?;
//!
//! assert_eq!(project.state(), &IMPLEMENTING);
//! assert_eq!(project.project().phase("review").map(|p| p.status), Some(PhaseStatus::Failed));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
mod error;
pub mod machine;
#[macro_use]
mod macros;
pub mod project;
pub mod registry;
pub mod runtime;

pub use crate::core::{Event, Guard, State};
pub use config::{ProjectTypeConfig, ProjectTypeConfigBuilder};
pub use error::{BuildError, ConfigViolation};
pub use machine::{Machine, MachineBuilder, MachineError};
pub use project::{Artifact, PhaseState, PhaseStatus, ProjectState};
pub use registry::{Registry, RegistryError};
pub use runtime::{AdvanceError, AdvanceErrorKind, Project};
