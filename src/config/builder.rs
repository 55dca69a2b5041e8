//! Fluent assembly of a project type.

use super::branch::{BranchConfig, BranchOption};
use super::error::DeterminerError;
use super::phase::{PhaseConfig, PhaseDraft, PhaseOption};
use super::transition::{TransitionConfig, TransitionOption};
use super::{
    EventDeterminer, InitialInputs, Initializer, ProjectTypeConfig, PromptGenerator, Validator,
};
use crate::core::{BoxError, Event, State};
use crate::error::{BuildError, ConfigViolation};
use crate::project::ProjectState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

/// Builder for a [`ProjectTypeConfig`].
///
/// Problems are collected as the type is assembled and reported together
/// by [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use phaseflow::config::{
///     branch_on, when, with_end_state, with_failed_phase, with_start_state,
///     ProjectTypeConfigBuilder,
/// };
/// use phaseflow::core::{Event, State};
///
/// const REVIEW: State = State::from_static("Review");
/// const DONE: State = State::from_static("Done");
/// const PASS: Event = Event::from_static("pass");
/// const FAIL: Event = Event::from_static("fail");
///
/// let config = ProjectTypeConfigBuilder::new("review-only")
///     .initial_state(REVIEW)
///     .add_phase("review", [with_start_state(REVIEW), with_end_state(REVIEW)])
///     .add_branch(
///         REVIEW,
///         [
///             branch_on(|p| p.metadata_str("verdict").unwrap_or_default().to_string()),
///             when("pass", PASS, DONE, []),
///             when("fail", FAIL, REVIEW, [with_failed_phase("review")]),
///         ],
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(config.transitions().len(), 2);
/// assert!(config.determiner(&REVIEW).is_some());
/// ```
pub struct ProjectTypeConfigBuilder {
    name: String,
    initial_state: Option<State>,
    phases: Vec<PhaseDraft>,
    transitions: Vec<TransitionConfig>,
    branches: HashMap<State, BranchConfig>,
    prompts: HashMap<State, PromptGenerator>,
    orchestrator_prompt: Option<PromptGenerator>,
    determiners: HashMap<State, EventDeterminer>,
    explicit_determiners: HashSet<State>,
    initializer: Option<Initializer>,
    validator: Option<Validator>,
    violations: Vec<ConfigViolation>,
}

impl ProjectTypeConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_state: None,
            phases: Vec::new(),
            transitions: Vec::new(),
            branches: HashMap::new(),
            prompts: HashMap::new(),
            orchestrator_prompt: None,
            determiners: HashMap::new(),
            explicit_determiners: HashSet::new(),
            initializer: None,
            validator: None,
            violations: Vec::new(),
        }
    }

    /// Set the state new projects start in (required).
    pub fn initial_state(mut self, state: State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Declare a phase. Start and end states are required.
    pub fn add_phase(
        mut self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = PhaseOption>,
    ) -> Self {
        let mut draft = PhaseDraft::new(name);
        for option in options {
            draft.apply(option);
        }
        self.phases.push(draft);
        self
    }

    /// Declare a transition `from --event--> to`.
    pub fn add_transition(
        mut self,
        from: State,
        to: State,
        event: Event,
        options: impl IntoIterator<Item = TransitionOption>,
    ) -> Self {
        self.transitions
            .push(TransitionConfig::new(from, to, event).with_options(options));
        self
    }

    /// Declare an N-way branch leaving `from`.
    ///
    /// Every path becomes an ordinary transition, and a single determiner
    /// is generated for `from` that routes the discriminator's value to
    /// the matching path's event.
    pub fn add_branch(
        mut self,
        from: State,
        options: impl IntoIterator<Item = BranchOption>,
    ) -> Self {
        if self.branches.contains_key(&from) {
            self.violations
                .push(ConfigViolation::DuplicateBranch { state: from });
            return self;
        }

        let mut branch = BranchConfig::new(from.clone());
        for option in options {
            branch.apply(option);
        }

        if !branch.has_discriminator() {
            self.violations.push(ConfigViolation::MissingDiscriminator {
                state: from.clone(),
            });
        }
        if branch.paths().is_empty() {
            self.violations
                .push(ConfigViolation::EmptyBranch { state: from.clone() });
        }
        if self.explicit_determiners.contains(&from) {
            self.violations.push(ConfigViolation::ConflictingDeterminer {
                state: from.clone(),
            });
        }

        self.transitions.extend(branch.transitions());

        let routing = branch.clone();
        let determiner: EventDeterminer =
            Arc::new(move |project: &ProjectState| routing.determine(project));
        self.determiners.insert(from.clone(), determiner);
        self.branches.insert(from, branch);
        self
    }

    /// Register the determiner consulted by `advance` in `state`.
    pub fn on_advance<F>(mut self, state: State, determiner: F) -> Self
    where
        F: Fn(&ProjectState) -> Result<Event, DeterminerError> + Send + Sync + 'static,
    {
        if self.branches.contains_key(&state) {
            self.violations
                .push(ConfigViolation::ConflictingDeterminer { state });
            return self;
        }
        self.explicit_determiners.insert(state.clone());
        self.determiners.insert(state, Arc::new(determiner));
        self
    }

    /// Register the guidance text generator for `state`.
    pub fn set_prompt<F>(mut self, state: State, prompt: F) -> Self
    where
        F: Fn(&ProjectState) -> String + Send + Sync + 'static,
    {
        self.prompts.insert(state, Arc::new(prompt));
        self
    }

    /// Register project-wide guidance shown regardless of state.
    pub fn set_orchestrator_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&ProjectState) -> String + Send + Sync + 'static,
    {
        self.orchestrator_prompt = Some(Arc::new(prompt));
        self
    }

    /// Hook run when a project of this type is created.
    pub fn set_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut ProjectState, &InitialInputs) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Type-specific check run by `ProjectTypeConfig::validate`.
    pub fn set_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&ProjectState) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Build the project type, reporting every violation found.
    pub fn build(self) -> Result<ProjectTypeConfig, BuildError> {
        let mut checks: Vec<Check> = Vec::new();

        if self.initial_state.is_none() {
            checks.push(Validation::fail(ConfigViolation::MissingInitialState));
        }
        for violation in &self.violations {
            checks.push(Validation::fail(violation.clone()));
        }
        checks.extend(check_phases(&self.phases));
        checks.extend(check_transitions(&self.transitions, &self.phases));

        let violations: Vec<ConfigViolation> = match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        };

        let initial_state = match self.initial_state {
            Some(state) if violations.is_empty() => state,
            _ => {
                return Err(BuildError::InvalidConfig {
                    name: self.name,
                    violations,
                })
            }
        };

        let phases: Vec<PhaseConfig> = self
            .phases
            .into_iter()
            .filter_map(PhaseDraft::finish)
            .collect();

        tracing::debug!(
            project_type = %self.name,
            phases = phases.len(),
            transitions = self.transitions.len(),
            branches = self.branches.len(),
            "project type built"
        );

        Ok(ProjectTypeConfig {
            name: self.name,
            initial_state,
            phases,
            transitions: self.transitions,
            branches: self.branches,
            prompts: self.prompts,
            orchestrator_prompt: self.orchestrator_prompt,
            determiners: self.determiners,
            initializer: self.initializer,
            validator: self.validator,
        })
    }
}

fn check_phases(phases: &[PhaseDraft]) -> Vec<Check> {
    let mut checks = Vec::new();
    let mut seen = HashSet::new();
    for phase in phases {
        if !seen.insert(phase.name()) {
            checks.push(Validation::fail(ConfigViolation::DuplicatePhase {
                phase: phase.name().to_string(),
            }));
        }
        if !phase.has_start_state() {
            checks.push(Validation::fail(ConfigViolation::MissingPhaseStartState {
                phase: phase.name().to_string(),
            }));
        }
        if !phase.has_end_state() {
            checks.push(Validation::fail(ConfigViolation::MissingPhaseEndState {
                phase: phase.name().to_string(),
            }));
        }
    }
    checks
}

fn check_transitions(transitions: &[TransitionConfig], phases: &[PhaseDraft]) -> Vec<Check> {
    let mut checks = Vec::new();
    let mut seen = HashSet::new();
    for transition in transitions {
        if !seen.insert((transition.from(), transition.event())) {
            checks.push(Validation::fail(ConfigViolation::AmbiguousTransition {
                from: transition.from().clone(),
                event: transition.event().clone(),
            }));
        }
        if let Some(phase) = transition.failed_phase() {
            if !phases.iter().any(|p| p.name() == phase) {
                checks.push(Validation::fail(ConfigViolation::UnknownFailedPhase {
                    from: transition.from().clone(),
                    event: transition.event().clone(),
                    phase: phase.to_string(),
                }));
            }
        }
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{branch_on, when, with_end_state, with_start_state};

    const DRAFT: State = State::from_static("Draft");
    const REVIEW: State = State::from_static("Review");
    const DONE: State = State::from_static("Done");
    const SUBMIT: Event = Event::from_static("submit");
    const PASS: Event = Event::from_static("pass");
    const FAIL: Event = Event::from_static("fail");

    fn violations(result: Result<ProjectTypeConfig, BuildError>) -> Vec<ConfigViolation> {
        match result {
            Err(BuildError::InvalidConfig { violations, .. }) => violations,
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected build to fail"),
        }
    }

    #[test]
    fn minimal_config_builds() {
        let config = ProjectTypeConfigBuilder::new("minimal")
            .initial_state(DRAFT)
            .add_transition(DRAFT, DONE, SUBMIT, [])
            .build()
            .unwrap();

        assert_eq!(config.name(), "minimal");
        assert_eq!(config.initial_state(), &DRAFT);
    }

    #[test]
    fn build_accumulates_all_violations() {
        let result = ProjectTypeConfigBuilder::new("broken")
            .add_phase("review", [with_start_state(REVIEW)])
            .add_phase("review", [with_start_state(REVIEW), with_end_state(REVIEW)])
            .add_transition(DRAFT, REVIEW, SUBMIT, [])
            .add_transition(DRAFT, DONE, SUBMIT, [])
            .build();

        let found = violations(result);
        assert_eq!(found.len(), 4);
        assert!(found.contains(&ConfigViolation::MissingInitialState));
        assert!(found.contains(&ConfigViolation::MissingPhaseEndState {
            phase: "review".to_string()
        }));
        assert!(found.contains(&ConfigViolation::DuplicatePhase {
            phase: "review".to_string()
        }));
        assert!(found.contains(&ConfigViolation::AmbiguousTransition {
            from: DRAFT,
            event: SUBMIT
        }));
    }

    #[test]
    fn branch_without_discriminator_or_paths_is_rejected() {
        let result = ProjectTypeConfigBuilder::new("branchy")
            .initial_state(REVIEW)
            .add_branch(REVIEW, [])
            .build();

        let found = violations(result);
        assert!(found.contains(&ConfigViolation::MissingDiscriminator { state: REVIEW }));
        assert!(found.contains(&ConfigViolation::EmptyBranch { state: REVIEW }));
    }

    #[test]
    fn explicit_determiner_on_branching_state_conflicts() {
        let result = ProjectTypeConfigBuilder::new("branchy")
            .initial_state(REVIEW)
            .add_branch(
                REVIEW,
                [
                    branch_on(|_| "pass".to_string()),
                    when("pass", PASS, DONE, []),
                ],
            )
            .on_advance(REVIEW, |_| Ok(PASS))
            .build();

        assert_eq!(
            violations(result),
            vec![ConfigViolation::ConflictingDeterminer { state: REVIEW }]
        );
    }

    #[test]
    fn branch_after_explicit_determiner_conflicts() {
        let result = ProjectTypeConfigBuilder::new("branchy")
            .initial_state(REVIEW)
            .on_advance(REVIEW, |_| Ok(PASS))
            .add_branch(
                REVIEW,
                [
                    branch_on(|_| "pass".to_string()),
                    when("pass", PASS, DONE, []),
                ],
            )
            .build();

        assert!(violations(result).contains(&ConfigViolation::ConflictingDeterminer { state: REVIEW }));
    }

    #[test]
    fn second_branch_on_same_state_is_rejected() {
        let result = ProjectTypeConfigBuilder::new("branchy")
            .initial_state(REVIEW)
            .add_branch(
                REVIEW,
                [
                    branch_on(|_| "pass".to_string()),
                    when("pass", PASS, DONE, []),
                ],
            )
            .add_branch(
                REVIEW,
                [
                    branch_on(|_| "fail".to_string()),
                    when("fail", FAIL, DRAFT, []),
                ],
            )
            .build();

        assert_eq!(
            violations(result),
            vec![ConfigViolation::DuplicateBranch { state: REVIEW }]
        );
    }

    #[test]
    fn failed_phase_must_be_declared() {
        let result = ProjectTypeConfigBuilder::new("rework")
            .initial_state(REVIEW)
            .add_transition(
                REVIEW,
                DRAFT,
                FAIL,
                [crate::config::with_failed_phase("review")],
            )
            .build();

        assert_eq!(
            violations(result),
            vec![ConfigViolation::UnknownFailedPhase {
                from: REVIEW,
                event: FAIL,
                phase: "review".to_string(),
            }]
        );
    }

    #[test]
    fn branch_synthesizes_one_transition_per_path() {
        let config = ProjectTypeConfigBuilder::new("branchy")
            .initial_state(REVIEW)
            .add_branch(
                REVIEW,
                [
                    branch_on(|_| "fail".to_string()),
                    when("pass", PASS, DONE, []),
                    when("fail", FAIL, DRAFT, []),
                ],
            )
            .build()
            .unwrap();

        assert_eq!(config.transitions().len(), 2);
        let determiner = config.determiner(&REVIEW).unwrap();
        let project = ProjectState::new("p", "branchy", REVIEW);
        assert_eq!(determiner(&project).unwrap(), FAIL);
    }
}
