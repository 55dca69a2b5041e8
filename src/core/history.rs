//! Transition history tracking.
//!
//! Provides immutable tracking of fired transitions over time.

use super::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single fired transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being transitioned from
    pub from: State,
    /// The state being transitioned to
    pub to: State,
    /// The event that fired the transition
    pub event: Event,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use phaseflow::core::{Event, State, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = TransitionHistory::new().record(TransitionRecord {
///     from: State::from("Start"),
///     to: State::from("Middle"),
///     event: Event::from("go"),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 2); // Start -> Middle
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: Vec<TransitionRecord>,
}

impl TransitionHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the source of the first transition followed by the target of
    /// each transition, in order.
    pub fn get_path(&self) -> Vec<&State> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Events fired, in order.
    pub fn events(&self) -> Vec<&Event> {
        self.transitions.iter().map(|t| &t.event).collect()
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
