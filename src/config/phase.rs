//! Static description of one phase of a project type.

use crate::core::State;

/// One phase: a span of states that share a coarse lifecycle status.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseConfig {
    name: String,
    start_state: State,
    end_state: State,
    states: Vec<State>,
    allowed_inputs: Vec<String>,
    allowed_outputs: Vec<String>,
    supports_tasks: bool,
    metadata_schema: Option<String>,
}

impl PhaseConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entering this state starts the phase.
    pub fn start_state(&self) -> &State {
        &self.start_state
    }

    /// Leaving this state for another phase completes the phase.
    pub fn end_state(&self) -> &State {
        &self.end_state
    }

    /// States between start and end that were declared with [`with_states`].
    pub fn intermediate_states(&self) -> &[State] {
        &self.states
    }

    /// True if `state` belongs to this phase.
    pub fn contains(&self, state: &State) -> bool {
        &self.start_state == state || &self.end_state == state || self.states.contains(state)
    }

    pub fn allowed_input_types(&self) -> &[String] {
        &self.allowed_inputs
    }

    pub fn allowed_output_types(&self) -> &[String] {
        &self.allowed_outputs
    }

    /// An empty allow-list accepts every artifact type.
    pub fn allows_input(&self, artifact_type: &str) -> bool {
        self.allowed_inputs.is_empty() || self.allowed_inputs.iter().any(|t| t == artifact_type)
    }

    /// An empty allow-list accepts every artifact type.
    pub fn allows_output(&self, artifact_type: &str) -> bool {
        self.allowed_outputs.is_empty() || self.allowed_outputs.iter().any(|t| t == artifact_type)
    }

    pub fn supports_tasks(&self) -> bool {
        self.supports_tasks
    }

    /// Reference to the schema that validates this phase's metadata.
    pub fn metadata_schema(&self) -> Option<&str> {
        self.metadata_schema.as_deref()
    }
}

/// Option applied by `ProjectTypeConfigBuilder::add_phase`.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseOption {
    StartState(State),
    EndState(State),
    States(Vec<State>),
    Inputs(Vec<String>),
    Outputs(Vec<String>),
    Tasks,
    MetadataSchema(String),
}

pub fn with_start_state(state: State) -> PhaseOption {
    PhaseOption::StartState(state)
}

pub fn with_end_state(state: State) -> PhaseOption {
    PhaseOption::EndState(state)
}

/// Declare states strictly between the start and end state.
pub fn with_states(states: impl IntoIterator<Item = State>) -> PhaseOption {
    PhaseOption::States(states.into_iter().collect())
}

pub fn with_inputs<T: Into<String>>(types: impl IntoIterator<Item = T>) -> PhaseOption {
    PhaseOption::Inputs(types.into_iter().map(Into::into).collect())
}

pub fn with_outputs<T: Into<String>>(types: impl IntoIterator<Item = T>) -> PhaseOption {
    PhaseOption::Outputs(types.into_iter().map(Into::into).collect())
}

pub fn with_tasks() -> PhaseOption {
    PhaseOption::Tasks
}

pub fn with_metadata_schema(schema: impl Into<String>) -> PhaseOption {
    PhaseOption::MetadataSchema(schema.into())
}

/// Phase under construction; start and end are checked when it is finished.
#[derive(Debug, Default)]
pub(crate) struct PhaseDraft {
    name: String,
    start_state: Option<State>,
    end_state: Option<State>,
    states: Vec<State>,
    allowed_inputs: Vec<String>,
    allowed_outputs: Vec<String>,
    supports_tasks: bool,
    metadata_schema: Option<String>,
}

impl PhaseDraft {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&mut self, option: PhaseOption) {
        match option {
            PhaseOption::StartState(state) => self.start_state = Some(state),
            PhaseOption::EndState(state) => self.end_state = Some(state),
            PhaseOption::States(states) => self.states.extend(states),
            PhaseOption::Inputs(types) => self.allowed_inputs.extend(types),
            PhaseOption::Outputs(types) => self.allowed_outputs.extend(types),
            PhaseOption::Tasks => self.supports_tasks = true,
            PhaseOption::MetadataSchema(schema) => self.metadata_schema = Some(schema),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn has_start_state(&self) -> bool {
        self.start_state.is_some()
    }

    pub(crate) fn has_end_state(&self) -> bool {
        self.end_state.is_some()
    }

    /// Finish the phase; `None` if the start or end state is missing.
    pub(crate) fn finish(self) -> Option<PhaseConfig> {
        Some(PhaseConfig {
            name: self.name,
            start_state: self.start_state?,
            end_state: self.end_state?,
            states: self.states,
            allowed_inputs: self.allowed_inputs,
            allowed_outputs: self.allowed_outputs,
            supports_tasks: self.supports_tasks,
            metadata_schema: self.metadata_schema,
        })
    }
}
