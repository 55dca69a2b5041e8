//! Declarative N-way branching.
//!
//! A branch is one discriminator plus named paths. The builder expands each
//! path into an ordinary transition and folds the discriminator into a
//! single generated event determiner for the branching state.

use super::error::DeterminerError;
use super::transition::{TransitionConfig, TransitionOption};
use super::{ActionTemplate, Discriminator, GuardTemplate};
use crate::core::{Event, State};
use crate::project::ProjectState;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One outcome of a branch: the event to fire and where it leads.
#[derive(Clone)]
pub struct BranchPath {
    value: String,
    event: Event,
    to: State,
    guard: Option<GuardTemplate>,
    on_entry: Option<ActionTemplate>,
    on_exit: Option<ActionTemplate>,
    failed_phase: Option<String>,
    description: String,
}

impl BranchPath {
    /// Copy the optional fields of a scratch transition onto a path.
    fn from_scratch(value: String, scratch: TransitionConfig) -> Self {
        Self {
            value,
            event: scratch.event,
            to: scratch.to,
            guard: scratch.guard,
            on_entry: scratch.on_entry,
            on_exit: scratch.on_exit,
            failed_phase: scratch.failed_phase,
            description: scratch.description,
        }
    }

    /// The ordinary transition this path expands to.
    pub(crate) fn to_transition(&self, from: &State) -> TransitionConfig {
        TransitionConfig {
            from: from.clone(),
            to: self.to.clone(),
            event: self.event.clone(),
            guard: self.guard.clone(),
            on_entry: self.on_entry.clone(),
            on_exit: self.on_exit.clone(),
            failed_phase: self.failed_phase.clone(),
            description: self.description.clone(),
        }
    }

    /// Discriminator value that selects this path.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn to(&self) -> &State {
        &self.to
    }

    pub fn guard(&self) -> Option<&GuardTemplate> {
        self.guard.as_ref()
    }

    pub fn failed_phase(&self) -> Option<&str> {
        self.failed_phase.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchPath")
            .field("value", &self.value)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("guard", &self.guard)
            .field("failed_phase", &self.failed_phase)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A decision point leaving `from`.
#[derive(Clone)]
pub struct BranchConfig {
    from: State,
    discriminator: Option<Discriminator>,
    paths: BTreeMap<String, BranchPath>,
}

impl BranchConfig {
    pub(crate) fn new(from: State) -> Self {
        Self {
            from,
            discriminator: None,
            paths: BTreeMap::new(),
        }
    }

    pub fn from(&self) -> &State {
        &self.from
    }

    pub fn has_discriminator(&self) -> bool {
        self.discriminator.is_some()
    }

    /// Paths keyed by discriminator value.
    pub fn paths(&self) -> &BTreeMap<String, BranchPath> {
        &self.paths
    }

    pub fn path(&self, value: &str) -> Option<&BranchPath> {
        self.paths.get(value)
    }

    /// Configured discriminator values, sorted.
    pub fn values(&self) -> Vec<&str> {
        self.paths.keys().map(String::as_str).collect()
    }

    /// Ordinary transitions synthesized from the paths.
    pub(crate) fn transitions(&self) -> Vec<TransitionConfig> {
        self.paths
            .values()
            .map(|path| path.to_transition(&self.from))
            .collect()
    }

    /// Run the discriminator and map its value to the path's event.
    ///
    /// A value that matches no path, including the empty string, is an
    /// error rather than a silent default.
    pub fn determine(&self, project: &ProjectState) -> Result<Event, DeterminerError> {
        let discriminator = self.discriminator.as_ref().ok_or_else(|| {
            DeterminerError::Undecided(format!("branch at state '{}' has no discriminator", self.from))
        })?;

        let value = discriminator(project);
        match self.paths.get(&value) {
            Some(path) => Ok(path.event.clone()),
            None => Err(DeterminerError::UnmatchedBranch {
                state: self.from.clone(),
                value,
                expected: self.paths.keys().cloned().collect(),
            }),
        }
    }

    pub(crate) fn apply(&mut self, option: BranchOption) {
        match option {
            BranchOption::Discriminator(discriminator) => self.discriminator = Some(discriminator),
            BranchOption::Path(path) => {
                let value = path.value.clone();
                if let Some(replaced) = self.paths.insert(value.clone(), path) {
                    tracing::warn!(
                        state = %self.from,
                        value = %value,
                        replaced_event = %replaced.event,
                        "branch value registered twice, keeping the later path"
                    );
                }
            }
        }
    }
}

impl fmt::Debug for BranchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchConfig")
            .field("from", &self.from)
            .field("has_discriminator", &self.discriminator.is_some())
            .field("paths", &self.paths)
            .finish()
    }
}

/// Option applied by `ProjectTypeConfigBuilder::add_branch`.
pub enum BranchOption {
    Discriminator(Discriminator),
    Path(BranchPath),
}

/// Decide the branch by calling `discriminator` with the live project.
pub fn branch_on<F>(discriminator: F) -> BranchOption
where
    F: Fn(&ProjectState) -> String + Send + Sync + 'static,
{
    BranchOption::Discriminator(Arc::new(discriminator))
}

/// Route discriminator value `value` to `event`, leading to `to`.
///
/// Registering the same value twice keeps the later path.
pub fn when(
    value: impl Into<String>,
    event: Event,
    to: State,
    options: impl IntoIterator<Item = TransitionOption>,
) -> BranchOption {
    // The source state is filled in when the path expands to a transition.
    let scratch = TransitionConfig::new(State::from_static(""), to, event).with_options(options);
    BranchOption::Path(BranchPath::from_scratch(value.into(), scratch))
}
