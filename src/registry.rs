//! Explicit registry of project types.
//!
//! Populated once at startup and passed to whatever loads projects. There
//! is no process-global instance.

use crate::config::{InitialInputs, InitializeError, ProjectTypeConfig};
use crate::error::BuildError;
use crate::project::ProjectState;
use crate::runtime::Project;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("project type '{0}' is already registered")]
    DuplicateType(String),

    #[error("unknown project type '{0}'")]
    UnknownType(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Initialize(#[from] InitializeError),
}

/// Write-once mapping from type name to configuration.
#[derive(Debug, Default)]
pub struct Registry {
    types: HashMap<String, Arc<ProjectTypeConfig>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `config` under its own name.
    pub fn register(
        &mut self,
        config: ProjectTypeConfig,
    ) -> Result<Arc<ProjectTypeConfig>, RegistryError> {
        let name = config.name().to_string();
        if self.types.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }

        let config = Arc::new(config);
        self.types.insert(name.clone(), Arc::clone(&config));
        tracing::debug!(project_type = %name, "project type registered");
        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ProjectTypeConfig>> {
        self.types.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<ProjectTypeConfig>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Rebind persisted project data to its type.
    pub fn load(&self, state: ProjectState) -> Result<Project, RegistryError> {
        let config = Arc::clone(self.lookup(&state.project_type)?);
        Ok(Project::new(config, state)?)
    }

    /// Create a new project of type `project_type`.
    pub fn create(
        &self,
        project_type: &str,
        name: impl Into<String>,
        initial_inputs: InitialInputs,
    ) -> Result<Project, RegistryError> {
        let config = Arc::clone(self.lookup(project_type)?);
        let state = config.create_project(name, initial_inputs)?;
        Ok(Project::new(config, state)?)
    }
}
