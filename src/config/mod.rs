//! Domain-level description of a project type.
//!
//! A [`ProjectTypeConfig`] is built once per type with
//! [`ProjectTypeConfigBuilder`] and then shared read-only by every project
//! of that type. It knows the phases, the transitions (including those
//! synthesized from branches), the per-state prompts and the event
//! determiners that drive `Project::advance`.

mod branch;
mod builder;
mod error;
mod phase;
mod transition;
mod validation;

pub use branch::{branch_on, when, BranchConfig, BranchOption, BranchPath};
pub use builder::ProjectTypeConfigBuilder;
pub use error::{DeterminerError, InitializeError};
pub use phase::{
    with_end_state, with_inputs, with_metadata_schema, with_outputs, with_start_state,
    with_states, with_tasks, PhaseConfig, PhaseOption,
};
pub use transition::{
    with_description, with_failed_phase, with_guard, with_on_entry, with_on_exit,
    TransitionConfig, TransitionInfo, TransitionOption,
};
pub use validation::{ProjectValidationError, ProjectViolation};

use crate::core::{prompt_fn, Action, BoxError, Event, Guard, State};
pub use crate::error::{BuildError, ConfigViolation};
use crate::machine::{Machine, MachineBuilder, MachineOption};
use crate::project::{Artifact, PhaseState, PhaseStatus, ProjectState};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Guard written against a project.
pub type GuardTemplate = Guard<ProjectState>;

/// Action written against a project.
pub type ActionTemplate = Action<ProjectState>;

/// Picks the event to fire next from a given state.
///
/// Plain determiners registered with `on_advance` and the ones generated
/// by `add_branch` share this type.
pub type EventDeterminer =
    Arc<dyn Fn(&ProjectState) -> Result<Event, DeterminerError> + Send + Sync>;

/// Returns the value that selects a branch path.
pub type Discriminator = Arc<dyn Fn(&ProjectState) -> String + Send + Sync>;

/// Produces guidance text from a project.
pub type PromptGenerator = Arc<dyn Fn(&ProjectState) -> String + Send + Sync>;

/// Input artifacts supplied at creation, keyed by phase name.
pub type InitialInputs = BTreeMap<String, Vec<Artifact>>;

/// Hook run after a new project's phases are laid out.
pub type Initializer =
    Arc<dyn Fn(&mut ProjectState, &InitialInputs) -> Result<(), BoxError> + Send + Sync>;

/// Type-specific project validation.
pub type Validator = Arc<dyn Fn(&ProjectState) -> Result<(), BoxError> + Send + Sync>;

/// Complete, immutable description of one project type.
pub struct ProjectTypeConfig {
    pub(crate) name: String,
    pub(crate) initial_state: State,
    pub(crate) phases: Vec<PhaseConfig>,
    pub(crate) transitions: Vec<TransitionConfig>,
    pub(crate) branches: HashMap<State, BranchConfig>,
    pub(crate) prompts: HashMap<State, PromptGenerator>,
    pub(crate) orchestrator_prompt: Option<PromptGenerator>,
    pub(crate) determiners: HashMap<State, EventDeterminer>,
    pub(crate) initializer: Option<Initializer>,
    pub(crate) validator: Option<Validator>,
}

impl ProjectTypeConfig {
    /// Name projects of this type are registered and persisted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State new projects start in.
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Phases in declaration order.
    pub fn phases(&self) -> &[PhaseConfig] {
        &self.phases
    }

    /// Look up a declared phase by name.
    pub fn phase(&self, name: &str) -> Option<&PhaseConfig> {
        self.phases.iter().find(|p| p.name() == name)
    }

    /// The phase `state` belongs to. The first declared match wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use phaseflow::config::{with_end_state, with_start_state, with_states, ProjectTypeConfigBuilder};
    /// use phaseflow::{events, states};
    ///
    /// states! {
    ///     PLANNING = "Planning";
    ///     DRAFTING = "Drafting";
    ///     EXECUTING = "Executing";
    ///     DONE = "Done";
    /// }
    /// events! {
    ///     DRAFT = "draft";
    ///     EXECUTE = "execute";
    ///     FINISH = "finish";
    /// }
    ///
    /// let config = ProjectTypeConfigBuilder::new("standard")
    ///     .initial_state(PLANNING)
    ///     .add_phase(
    ///         "implementation",
    ///         [with_start_state(PLANNING), with_states([DRAFTING]), with_end_state(EXECUTING)],
    ///     )
    ///     .add_transition(PLANNING, DRAFTING, DRAFT, [])
    ///     .add_transition(DRAFTING, EXECUTING, EXECUTE, [])
    ///     .add_transition(EXECUTING, DONE, FINISH, [])
    ///     .build()?;
    ///
    /// assert_eq!(config.phase_for_state(&DRAFTING).map(|p| p.name()), Some("implementation"));
    /// assert!(config.phase_for_state(&DONE).is_none());
    /// # Ok::<(), phaseflow::BuildError>(())
    /// ```
    pub fn phase_for_state(&self, state: &State) -> Option<&PhaseConfig> {
        self.phases.iter().find(|p| p.contains(state))
    }

    /// True if `state` is the declared start state of `phase`. Unknown
    /// phases answer false.
    pub fn is_phase_start_state(&self, phase: &str, state: &State) -> bool {
        self.phase(phase).is_some_and(|p| p.start_state() == state)
    }

    /// True if `state` is the declared end state of `phase`.
    pub fn is_phase_end_state(&self, phase: &str, state: &State) -> bool {
        self.phase(phase).is_some_and(|p| p.end_state() == state)
    }

    /// Every transition, including those synthesized from branches.
    pub fn transitions(&self) -> &[TransitionConfig] {
        &self.transitions
    }

    /// Look up the exact transition `from --event--> to`.
    pub fn transition(&self, from: &State, to: &State, event: &Event) -> Option<&TransitionConfig> {
        self.transitions
            .iter()
            .find(|t| &t.from == from && &t.to == to && &t.event == event)
    }

    /// Transitions leaving `state`, in declaration order.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = &'a TransitionConfig> + 'a {
        self.transitions.iter().filter(move |t| &t.from == state)
    }

    /// Discovery listing of the transitions leaving `state`.
    pub fn available_transitions(&self, state: &State) -> Vec<TransitionInfo> {
        self.transitions_from(state).map(TransitionConfig::info).collect()
    }

    /// Where `event` leads from `from`, if configured.
    ///
    /// # Example
    ///
    /// ```rust
    /// use phaseflow::config::ProjectTypeConfigBuilder;
    /// use phaseflow::{Event, State};
    ///
    /// let config = ProjectTypeConfigBuilder::new("linear")
    ///     .initial_state(State::from("Start"))
    ///     .add_transition(State::from("Start"), State::from("End"), Event::from("go"), [])
    ///     .build()?;
    ///
    /// let to = config.target_state(&State::from("Start"), &Event::from("go"));
    /// assert_eq!(to.map(State::as_str), Some("End"));
    /// # Ok::<(), phaseflow::BuildError>(())
    /// ```
    pub fn target_state(&self, from: &State, event: &Event) -> Option<&State> {
        self.transition_on(from, event).map(|t| &t.to)
    }

    /// Description of the guard on `from --event-->`, if any.
    pub fn guard_description(&self, from: &State, event: &Event) -> Option<&str> {
        self.transition_on(from, event)
            .and_then(|t| t.guard_description())
    }

    /// The transition `event` takes from `from`. Build validation makes it
    /// unique.
    pub fn transition_on(&self, from: &State, event: &Event) -> Option<&TransitionConfig> {
        self.transitions
            .iter()
            .find(|t| &t.from == from && &t.event == event)
    }

    /// True if `add_branch` declared a decision point at `state`.
    pub fn is_branching_state(&self, state: &State) -> bool {
        self.branches.contains_key(state)
    }

    /// The branch declared at `state`, if any.
    pub fn branch(&self, state: &State) -> Option<&BranchConfig> {
        self.branches.get(state)
    }

    /// Event determiner consulted by `advance` in `state`, whether
    /// registered with `on_advance` or generated by `add_branch`.
    pub fn determiner(&self, state: &State) -> Option<&EventDeterminer> {
        self.determiners.get(state)
    }

    /// Guidance for `state`, if a prompt was registered for it.
    pub fn prompt(&self, state: &State, project: &ProjectState) -> Option<String> {
        self.prompts.get(state).map(|generate| generate(project))
    }

    /// Project-wide guidance, independent of the current state.
    pub fn orchestrator_prompt(&self, project: &ProjectState) -> Option<String> {
        self.orchestrator_prompt
            .as_ref()
            .map(|generate| generate(project))
    }

    /// Every state mentioned by the configuration.
    pub fn states(&self) -> BTreeSet<&State> {
        let mut states = BTreeSet::new();
        states.insert(&self.initial_state);
        for transition in &self.transitions {
            states.insert(&transition.from);
            states.insert(&transition.to);
        }
        for phase in &self.phases {
            states.insert(phase.start_state());
            states.insert(phase.end_state());
            states.extend(phase.intermediate_states());
        }
        states
    }

    /// Build a machine positioned at `initial_state` carrying every
    /// configured transition and this type's prompts.
    ///
    /// The machine is cheap to build; it is rebuilt each time a project is
    /// loaded.
    pub fn build_machine(&self, initial_state: State) -> Result<Machine<ProjectState>, BuildError> {
        let mut builder = MachineBuilder::new(initial_state);
        for transition in &self.transitions {
            let mut options = Vec::with_capacity(3);
            if let Some(guard) = &transition.guard {
                options.push(MachineOption::Guard(guard.clone()));
            }
            if let Some(action) = &transition.on_entry {
                options.push(MachineOption::OnEntry(Arc::clone(action)));
            }
            if let Some(action) = &transition.on_exit {
                options.push(MachineOption::OnExit(Arc::clone(action)));
            }
            builder = builder.add_transition(
                transition.from.clone(),
                transition.to.clone(),
                transition.event.clone(),
                options,
            );
        }

        let prompts = self.prompts.clone();
        builder
            .prompt(prompt_fn(move |state: &State, project: &ProjectState| {
                prompts
                    .get(state)
                    .map(|generate| generate(project))
                    .unwrap_or_default()
            }))
            .build()
    }

    /// Create a new project of this type.
    ///
    /// Lays out one `not_started` phase per declared phase, attaches the
    /// initial inputs, starts the phase that begins at the initial state
    /// and finally runs the type's initializer.
    pub fn create_project(
        &self,
        name: impl Into<String>,
        initial_inputs: InitialInputs,
    ) -> Result<ProjectState, InitializeError> {
        let mut project = ProjectState::new(name, self.name.clone(), self.initial_state.clone());

        for phase in &self.phases {
            project
                .phases
                .insert(phase.name().to_string(), PhaseState::default());
        }

        for (phase_name, artifacts) in &initial_inputs {
            let phase = project
                .phases
                .get_mut(phase_name)
                .ok_or_else(|| InitializeError::UnknownPhase {
                    phase: phase_name.clone(),
                })?;
            phase.inputs.extend(artifacts.iter().cloned());
        }

        if let Some(phase) = self
            .phases
            .iter()
            .find(|p| p.start_state() == &self.initial_state)
        {
            let state = project.phase_entry(phase.name());
            state.status = PhaseStatus::InProgress;
            state.started_at = Some(Utc::now());
            state.iteration = 1;
        }

        if let Some(initializer) = &self.initializer {
            initializer(&mut project, &initial_inputs).map_err(|source| InitializeError::Hook {
                project: project.name.clone(),
                source,
            })?;
        }

        tracing::debug!(project = %project.name, project_type = %self.name, "project created");
        Ok(project)
    }
}

impl fmt::Debug for ProjectTypeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectTypeConfig")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .field("phases", &self.phases)
            .field("transitions", &self.transitions)
            .field("branches", &self.branches)
            .finish_non_exhaustive()
    }
}
