//! Declarative transitions between project states.

use super::{ActionTemplate, GuardTemplate};
use crate::core::{BoxError, Event, Guard, State};
use crate::project::ProjectState;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One `(from, to, event)` edge of a project type, with its options.
#[derive(Clone)]
pub struct TransitionConfig {
    pub(crate) from: State,
    pub(crate) to: State,
    pub(crate) event: Event,
    pub(crate) guard: Option<GuardTemplate>,
    pub(crate) on_entry: Option<ActionTemplate>,
    pub(crate) on_exit: Option<ActionTemplate>,
    pub(crate) failed_phase: Option<String>,
    pub(crate) description: String,
}

impl TransitionConfig {
    pub(crate) fn new(from: State, to: State, event: Event) -> Self {
        Self {
            from,
            to,
            event,
            guard: None,
            on_entry: None,
            on_exit: None,
            failed_phase: None,
            description: String::new(),
        }
    }

    pub(crate) fn with_options(mut self, options: impl IntoIterator<Item = TransitionOption>) -> Self {
        for option in options {
            option.apply(&mut self);
        }
        self
    }

    /// Source state.
    pub fn from(&self) -> &State {
        &self.from
    }

    /// Target state.
    pub fn to(&self) -> &State {
        &self.to
    }

    /// Event that fires this transition.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Precondition checked before firing, if any.
    pub fn guard(&self) -> Option<&GuardTemplate> {
        self.guard.as_ref()
    }

    /// Human-readable requirement shown when the guard blocks.
    pub fn guard_description(&self) -> Option<&str> {
        self.guard.as_ref().and_then(|g| g.description())
    }

    /// Action run after the state changes.
    pub fn on_entry(&self) -> Option<&ActionTemplate> {
        self.on_entry.as_ref()
    }

    /// Action run before leaving the source state.
    pub fn on_exit(&self) -> Option<&ActionTemplate> {
        self.on_exit.as_ref()
    }

    /// Phase marked `failed` when this transition fires.
    pub fn failed_phase(&self) -> Option<&str> {
        self.failed_phase.as_deref()
    }

    /// Free-form text for discovery listings; empty if unset.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Discovery summary of this transition.
    pub fn info(&self) -> TransitionInfo {
        TransitionInfo {
            event: self.event.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            description: self.description.clone(),
            guard_description: self.guard_description().map(str::to_string),
            failed_phase: self.failed_phase.clone(),
        }
    }
}

impl fmt::Debug for TransitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("event", &self.event)
            .field("guard", &self.guard)
            .field("failed_phase", &self.failed_phase)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Human-readable description of an available transition, for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionInfo {
    pub event: Event,
    pub from: State,
    pub to: State,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<String>,
}

/// Option applied to a transition or to a branch path.
pub enum TransitionOption {
    Guard(GuardTemplate),
    OnEntry(ActionTemplate),
    OnExit(ActionTemplate),
    FailedPhase(String),
    Description(String),
}

impl TransitionOption {
    pub(crate) fn apply(self, transition: &mut TransitionConfig) {
        match self {
            Self::Guard(guard) => transition.guard = Some(guard),
            Self::OnEntry(action) => transition.on_entry = Some(action),
            Self::OnExit(action) => transition.on_exit = Some(action),
            Self::FailedPhase(phase) => transition.failed_phase = Some(phase),
            Self::Description(description) => transition.description = description,
        }
    }
}

/// Gate the transition on `predicate`; `description` explains the
/// precondition when it blocks.
///
/// # Example
///
/// ```rust
/// use phaseflow::config::{with_guard, ProjectTypeConfigBuilder};
/// use phaseflow::{Event, ProjectState, State};
///
/// let config = ProjectTypeConfigBuilder::new("linear")
///     .initial_state(State::from("Planning"))
///     .add_transition(
///         State::from("Planning"),
///         State::from("Executing"),
///         Event::from("start"),
///         [with_guard("task list approved", |p: &ProjectState| {
///             p.phase("implementation")
///                 .is_some_and(|phase| phase.has_approved_output("task_list"))
///         })],
///     )
///     .build()?;
///
/// assert_eq!(
///     config.guard_description(&State::from("Planning"), &Event::from("start")),
///     Some("task list approved")
/// );
/// # Ok::<(), phaseflow::BuildError>(())
/// ```
pub fn with_guard<F>(description: impl Into<String>, predicate: F) -> TransitionOption
where
    F: Fn(&ProjectState) -> bool + Send + Sync + 'static,
{
    TransitionOption::Guard(Guard::described(description, predicate))
}

/// Run `action` after the target state is entered.
pub fn with_on_entry<F>(action: F) -> TransitionOption
where
    F: Fn(&mut ProjectState) -> Result<(), BoxError> + Send + Sync + 'static,
{
    TransitionOption::OnEntry(Arc::new(action))
}

/// Run `action` before the source state is left.
pub fn with_on_exit<F>(action: F) -> TransitionOption
where
    F: Fn(&mut ProjectState) -> Result<(), BoxError> + Send + Sync + 'static,
{
    TransitionOption::OnExit(Arc::new(action))
}

/// Mark `phase` failed when the transition fires (rework loops).
pub fn with_failed_phase(phase: impl Into<String>) -> TransitionOption {
    TransitionOption::FailedPhase(phase.into())
}

/// Text shown for the transition in discovery listings.
pub fn with_description(description: impl Into<String>) -> TransitionOption {
    TransitionOption::Description(description.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_populate_transition() {
        let transition = TransitionConfig::new(
            State::from("ReviewActive"),
            State::from("Planning"),
            Event::from("review_fail"),
        )
        .with_options([
            with_guard("review artifact approved", |p: &ProjectState| {
                p.phase("review")
                    .is_some_and(|phase| phase.has_approved_output("review"))
            }),
            with_failed_phase("review"),
            with_description("Review failed, rework the plan"),
            with_on_exit(|_| Ok(())),
        ]);

        assert_eq!(transition.failed_phase(), Some("review"));
        assert_eq!(transition.guard_description(), Some("review artifact approved"));
        assert_eq!(transition.description(), "Review failed, rework the plan");
        assert!(transition.on_exit().is_some());
        assert!(transition.on_entry().is_none());
    }

    #[test]
    fn later_option_replaces_earlier() {
        let transition = TransitionConfig::new(State::from("A"), State::from("B"), Event::from("go"))
            .with_options([with_description("first"), with_description("second")]);

        assert_eq!(transition.description(), "second");
    }

    #[test]
    fn info_summarizes_transition() {
        let transition = TransitionConfig::new(State::from("A"), State::from("B"), Event::from("go"))
            .with_options([with_guard("always", |_| true)]);

        let info = transition.info();
        assert_eq!(info.event, Event::from("go"));
        assert_eq!(info.to, State::from("B"));
        assert_eq!(info.guard_description.as_deref(), Some("always"));
        assert!(info.failed_phase.is_none());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["event"], "go");
        assert!(json.get("failed_phase").is_none());
    }
}
