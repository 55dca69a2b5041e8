//! Runtime project data.
//!
//! [`ProjectState`] is the serializable aggregate owned by the persistence
//! layer: phase states, free-form metadata and the persisted machine
//! position. Guards, actions and determiners are all written against it.

mod phase;

pub use phase::{Artifact, PhaseState, PhaseStatus, Task, TaskStatus};

use crate::core::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Persisted position of the project's machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statechart {
    pub current_state: State,
    pub updated_at: DateTime<Utc>,
}

/// Mutable runtime data of one project instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub name: String,
    /// Name of the registered project type this instance follows.
    #[serde(rename = "type")]
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Phase states keyed by phase name.
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseState>,
    pub statechart: Statechart,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl ProjectState {
    /// Create a project positioned at `initial_state` with no phases.
    pub fn new(
        name: impl Into<String>,
        project_type: impl Into<String>,
        initial_state: State,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            project_type: project_type.into(),
            description: None,
            created_at: now,
            updated_at: now,
            phases: BTreeMap::new(),
            statechart: Statechart {
                current_state: initial_state,
                updated_at: now,
            },
            metadata: BTreeMap::new(),
        }
    }

    /// Current persisted machine state.
    pub fn current_state(&self) -> &State {
        &self.statechart.current_state
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseState> {
        self.phases.get(name)
    }

    pub fn phase_mut(&mut self, name: &str) -> Option<&mut PhaseState> {
        self.phases.get_mut(name)
    }

    /// Phase state for `name`, created with defaults if absent.
    pub fn phase_entry(&mut self, name: &str) -> &mut PhaseState {
        self.phases.entry(name.to_string()).or_default()
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Record a machine move and bump `updated_at`.
    pub(crate) fn set_current_state(&mut self, state: State) {
        let now = Utc::now();
        self.statechart.current_state = state;
        self.statechart.updated_at = now;
        self.updated_at = now;
    }
}
