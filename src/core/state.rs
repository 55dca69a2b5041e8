//! Opaque identifiers for machine states and events.
//!
//! Both are thin string newtypes so that a `State` can never be passed
//! where an `Event` is expected. They can be declared as `const` items via
//! [`State::from_static`] / [`Event::from_static`] or the [`states!`] and
//! [`events!`] macros.
//!
//! [`states!`]: crate::states
//! [`events!`]: crate::events

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A node in a project-type state machine (e.g. `"ReviewActive"`).
///
/// # Example
///
/// ```rust
/// use phaseflow::core::State;
///
/// const PLANNING: State = State::from_static("Planning");
///
/// let loaded = State::new(String::from("Planning"));
/// assert_eq!(PLANNING, loaded);
/// assert_eq!(loaded.as_str(), "Planning");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Cow<'static, str>);

impl State {
    /// Create a state from an owned or borrowed string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Create a state from a string literal. Usable in `const` items.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The state's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty state, which no machine ever enters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for State {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for State {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named trigger that selects a transition out of the current state
/// (e.g. `"review_pass"`).
///
/// Several transitions may share an event as long as they leave from
/// different states.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Cow<'static, str>);

impl Event {
    /// Create an event from an owned or borrowed string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Create an event from a string literal. Usable in `const` items.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The event's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Event {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for Event {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
