//! Generic finite state machine over an execution context.
//!
//! A [`Machine`] owns its current [`State`] and the transition graph baked
//! in by [`MachineBuilder`]. It owns no domain data: guards and actions
//! receive the context `C` explicitly on every call, which lets the caller
//! keep the context and the machine side by side without shared mutable
//! references.

mod builder;
mod error;

pub use builder::{MachineBuilder, MachineOption};
pub use error::MachineError;

use crate::core::{Action, Event, Guard, PromptFunc, State, TransitionHistory, TransitionRecord};
use chrono::Utc;
use std::fmt;

/// One edge of the machine.
pub struct MachineTransition<C> {
    pub from: State,
    pub to: State,
    pub event: Event,
    pub guard: Option<Guard<C>>,
    pub on_entry: Option<Action<C>>,
    pub on_exit: Option<Action<C>>,
}

impl<C> MachineTransition<C> {
    /// Evaluate the guard, if any, without side effects.
    pub fn guard_allows(&self, context: &C) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(context))
    }
}

impl<C> fmt::Debug for MachineTransition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineTransition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("event", &self.event)
            .field("guard", &self.guard)
            .field("on_entry", &self.on_entry.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// Type-safe state machine.
pub struct Machine<C> {
    current: State,
    transitions: Vec<MachineTransition<C>>,
    prompt: Option<PromptFunc<C>>,
    history: TransitionHistory,
}

impl<C> Machine<C> {
    /// Current state.
    pub fn state(&self) -> &State {
        &self.current
    }

    /// Transitions fired by this machine instance.
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// All transitions, in the order they were added.
    pub fn transitions(&self) -> &[MachineTransition<C>] {
        &self.transitions
    }

    /// The transition that `event` would take from the current state.
    pub fn transition_for(&self, event: &Event) -> Option<&MachineTransition<C>> {
        self.transitions
            .iter()
            .find(|t| t.from == self.current && &t.event == event)
    }

    /// Check whether `event` can fire from the current state.
    ///
    /// Evaluates the guard without mutating anything. Returns
    /// [`MachineError::NoTransition`] if the event is not configured from the
    /// current state at all.
    pub fn can_fire(&self, event: &Event, context: &C) -> Result<bool, MachineError> {
        let transition = self
            .transition_for(event)
            .ok_or_else(|| MachineError::NoTransition {
                state: self.current.clone(),
                event: event.clone(),
            })?;
        Ok(transition.guard_allows(context))
    }

    /// Fire `event`.
    ///
    /// Runs, in order: the exit action, the state change, the entry action.
    /// If either action fails the machine stays in the source state.
    pub fn fire(&mut self, event: &Event, context: &mut C) -> Result<(), MachineError> {
        let transition = self
            .transition_for(event)
            .ok_or_else(|| MachineError::NoTransition {
                state: self.current.clone(),
                event: event.clone(),
            })?;

        if !transition.guard_allows(context) {
            return Err(MachineError::GuardBlocked {
                state: self.current.clone(),
                event: event.clone(),
                description: transition
                    .guard
                    .as_ref()
                    .and_then(|g| g.description())
                    .map(str::to_string),
            });
        }

        let from = self.current.clone();
        let to = transition.to.clone();
        let on_exit = transition.on_exit.clone();
        let on_entry = transition.on_entry.clone();

        if let Some(on_exit) = on_exit {
            on_exit(context).map_err(|source| MachineError::ExitActionFailed {
                state: from.clone(),
                event: event.clone(),
                source,
            })?;
        }

        self.current = to.clone();

        if let Some(on_entry) = on_entry {
            if let Err(source) = on_entry(context) {
                self.current = from;
                return Err(MachineError::EntryActionFailed {
                    state: to,
                    event: event.clone(),
                    source,
                });
            }
        }

        tracing::debug!(from = %from, to = %to, event = %event, "transition fired");
        self.history = self.history.record(TransitionRecord {
            from,
            to,
            event: event.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Events whose guards currently pass from the current state.
    pub fn permitted_triggers(&self, context: &C) -> Vec<Event> {
        self.transitions
            .iter()
            .filter(|t| t.from == self.current && t.guard_allows(context))
            .map(|t| t.event.clone())
            .collect()
    }

    /// Events configured from the current state, ignoring guards.
    pub fn configured_events(&self) -> Vec<Event> {
        self.transitions
            .iter()
            .filter(|t| t.from == self.current)
            .map(|t| t.event.clone())
            .collect()
    }

    /// Guidance text for the current state; empty if no prompt is set.
    pub fn prompt(&self, context: &C) -> String {
        self.prompt
            .as_ref()
            .map(|prompt| prompt(&self.current, context))
            .unwrap_or_default()
    }
}

impl<C> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("transitions", &self.transitions)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
