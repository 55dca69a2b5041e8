//! A live project: its data, its type and the machine bound to both.
//!
//! [`Project`] is what a caller loads, advances and saves. The machine is
//! never persisted; it is rebuilt from `statechart.current_state` whenever
//! a [`Project`] is constructed.

mod error;
mod phase_sync;

pub use error::{AdvanceError, AdvanceErrorKind};

use crate::config::{ProjectTypeConfig, ProjectValidationError, TransitionInfo};
use crate::core::{Event, State, TransitionHistory};
use crate::error::BuildError;
use crate::machine::{Machine, MachineError};
use crate::project::ProjectState;
use phase_sync::sync_phases;
use std::fmt;
use std::sync::Arc;

/// Project data bound to its type's machine.
pub struct Project {
    config: Arc<ProjectTypeConfig>,
    machine: Machine<ProjectState>,
    state: ProjectState,
}

impl Project {
    /// Bind `state` to a machine built from `config`, positioned at the
    /// project's persisted state.
    pub fn new(config: Arc<ProjectTypeConfig>, state: ProjectState) -> Result<Self, BuildError> {
        let machine = config.build_machine(state.current_state().clone())?;
        Ok(Self {
            config,
            machine,
            state,
        })
    }

    pub fn state(&self) -> &State {
        self.machine.state()
    }

    pub fn project(&self) -> &ProjectState {
        &self.state
    }

    /// Mutable access for direct phase, artifact and metadata edits.
    ///
    /// The machine position is owned by the machine; changes made here to
    /// `statechart` are overwritten on the next fire.
    pub fn project_mut(&mut self) -> &mut ProjectState {
        &mut self.state
    }

    /// Release the data for persistence.
    pub fn into_state(self) -> ProjectState {
        self.state
    }

    pub fn machine(&self) -> &Machine<ProjectState> {
        &self.machine
    }

    pub fn config(&self) -> &ProjectTypeConfig {
        &self.config
    }

    /// Transitions fired since this project was loaded.
    pub fn history(&self) -> &TransitionHistory {
        self.machine.history()
    }

    /// Guidance for the current state.
    pub fn prompt(&self) -> String {
        self.machine.prompt(&self.state)
    }

    pub fn orchestrator_prompt(&self) -> Option<String> {
        self.config.orchestrator_prompt(&self.state)
    }

    pub fn can_fire(&self, event: &Event) -> Result<bool, MachineError> {
        self.machine.can_fire(event, &self.state)
    }

    /// Events whose guards currently pass.
    pub fn permitted_events(&self) -> Vec<Event> {
        self.machine.permitted_triggers(&self.state)
    }

    /// Discovery listing for the current state.
    pub fn available_transitions(&self) -> Vec<TransitionInfo> {
        self.config.available_transitions(self.machine.state())
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        self.config.validate(&self.state)
    }

    /// Ask the current state's determiner which event comes next.
    pub fn determine_event(&self) -> Result<Event, AdvanceError> {
        let state = self.machine.state();
        let determiner = self
            .config
            .determiner(state)
            .ok_or_else(|| AdvanceError::NoDeterminer {
                state: state.clone(),
            })?;

        determiner(&self.state).map_err(|source| AdvanceError::Undetermined {
            state: state.clone(),
            source,
        })
    }

    /// Fire a caller-chosen `event`, bypassing the determiner.
    ///
    /// Phase statuses are synced exactly as they are by `advance`.
    pub fn fire(&mut self, event: &Event) -> Result<(), MachineError> {
        self.fire_with_phase_updates(event)
    }

    /// Fire `event` and bring phase statuses in line with the move.
    ///
    /// On failure the project data is restored to what it was before the
    /// call, including anything an exit action had already changed.
    pub fn fire_with_phase_updates(&mut self, event: &Event) -> Result<(), MachineError> {
        let snapshot = self.state.clone();
        let from = self.machine.state().clone();

        if let Err(err) = self.machine.fire(event, &mut self.state) {
            self.state = snapshot;
            return Err(err);
        }

        let to = self.machine.state().clone();
        sync_phases(&self.config, &mut self.state, &from, &to, event);
        self.state.set_current_state(to);
        Ok(())
    }

    /// Do the next right thing: determine the event for the current state,
    /// check its guard and fire it.
    pub fn advance(&mut self) -> Result<Event, AdvanceError> {
        let event = self.determine_event()?;
        let from = self.machine.state().clone();

        if !self.machine.can_fire(&event, &self.state)? {
            let guard = self
                .config
                .guard_description(&from, &event)
                .map(str::to_string);
            return Err(AdvanceError::Blocked {
                state: from,
                event,
                guard,
            });
        }

        self.fire_with_phase_updates(&event)?;
        tracing::info!(
            project = %self.state.name,
            from = %from,
            to = %self.machine.state(),
            event = %event,
            "project advanced"
        );
        Ok(event)
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("project_type", &self.config.name())
            .field("state", self.machine.state())
            .field("project", &self.state.name)
            .finish_non_exhaustive()
    }
}
