//! Live per-phase status, artifacts and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Coarse lifecycle status of one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
    Abandoned,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }

    /// True for statuses that end an iteration of the phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Abandoned)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file produced or consumed by a phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub path: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(artifact_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            path: path.into(),
            approved: false,
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    NeedsReview,
    Completed,
    Abandoned,
}

/// A unit of work tracked inside a phase that supports tasks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            status: TaskStatus::Pending,
            iteration: 1,
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Live status of one phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseState {
    #[serde(default)]
    pub status: PhaseStatus,
    /// Number of times the phase has been (re)started.
    #[serde(default)]
    pub iteration: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inputs: Vec<Artifact>,
    #[serde(default)]
    pub outputs: Vec<Artifact>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self {
            status: PhaseStatus::NotStarted,
            iteration: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            failed_at: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tasks: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

impl PhaseState {
    /// First output artifact of the given type.
    pub fn output(&self, artifact_type: &str) -> Option<&Artifact> {
        self.outputs
            .iter()
            .find(|a| a.artifact_type == artifact_type)
    }

    /// True if any output of `artifact_type` has been approved.
    pub fn has_approved_output(&self, artifact_type: &str) -> bool {
        self.outputs
            .iter()
            .any(|a| a.artifact_type == artifact_type && a.approved)
    }

    /// Most recently added output of `artifact_type`.
    pub fn latest_output(&self, artifact_type: &str) -> Option<&Artifact> {
        self.outputs
            .iter()
            .rev()
            .find(|a| a.artifact_type == artifact_type)
    }

    /// True if every task is completed or abandoned. Vacuously true when
    /// there are no tasks.
    pub fn all_tasks_settled(&self) -> bool {
        self.tasks
            .iter()
            .all(|t| matches!(t.status, TaskStatus::Completed | TaskStatus::Abandoned))
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(Value::as_bool)
    }
}
