//! Builder for constructing machines.

use super::{Machine, MachineTransition};
use crate::core::{Action, BoxError, Event, Guard, PromptFunc, State, TransitionHistory};
use crate::error::BuildError;
use std::collections::HashSet;
use std::sync::Arc;

/// Option attached to a single transition added through [`MachineBuilder`].
pub enum MachineOption<C> {
    Guard(Guard<C>),
    OnEntry(Action<C>),
    OnExit(Action<C>),
}

impl<C> MachineOption<C> {
    /// Guard the transition with an undescribed predicate.
    pub fn guard<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self::Guard(Guard::new(predicate))
    }

    /// Guard the transition; `description` is reported when it blocks.
    pub fn guarded<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self::Guard(Guard::described(description, predicate))
    }

    /// Run `f` after the machine has moved to the target state.
    pub fn on_entry<F>(f: F) -> Self
    where
        F: Fn(&mut C) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::OnEntry(Arc::new(f))
    }

    /// Run `f` before the machine leaves the source state.
    pub fn on_exit<F>(f: F) -> Self
    where
        F: Fn(&mut C) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::OnExit(Arc::new(f))
    }
}

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use phaseflow::core::{Event, State};
/// use phaseflow::machine::{MachineBuilder, MachineOption};
///
/// let draft = State::from("Draft");
/// let review = State::from("Review");
/// let submit = Event::from("submit");
///
/// let mut machine = MachineBuilder::<u32>::new(draft.clone())
///     .add_transition(
///         draft,
///         review.clone(),
///         submit.clone(),
///         [MachineOption::guarded("has words", |words: &u32| *words > 0)],
///     )
///     .build()
///     .unwrap();
///
/// let mut words = 0;
/// assert!(!machine.can_fire(&submit, &words).unwrap());
///
/// words = 120;
/// machine.fire(&submit, &mut words).unwrap();
/// assert_eq!(machine.state(), &review);
/// ```
pub struct MachineBuilder<C> {
    initial: State,
    transitions: Vec<MachineTransition<C>>,
    prompt: Option<PromptFunc<C>>,
}

impl<C> MachineBuilder<C> {
    /// Create a builder whose machine starts in `initial`.
    pub fn new(initial: State) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
            prompt: None,
        }
    }

    /// Add a transition `from --event--> to` with options.
    pub fn add_transition(
        mut self,
        from: State,
        to: State,
        event: Event,
        options: impl IntoIterator<Item = MachineOption<C>>,
    ) -> Self {
        let mut transition = MachineTransition {
            from,
            to,
            event,
            guard: None,
            on_entry: None,
            on_exit: None,
        };
        for option in options {
            match option {
                MachineOption::Guard(guard) => transition.guard = Some(guard),
                MachineOption::OnEntry(action) => transition.on_entry = Some(action),
                MachineOption::OnExit(action) => transition.on_exit = Some(action),
            }
        }
        self.transitions.push(transition);
        self
    }

    /// Set the prompt generator consulted by [`Machine::prompt`].
    pub fn prompt(mut self, prompt: PromptFunc<C>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Build the machine.
    ///
    /// Fails if two transitions leave the same state on the same event.
    pub fn build(self) -> Result<Machine<C>, BuildError> {
        let mut seen = HashSet::new();
        for transition in &self.transitions {
            if !seen.insert((&transition.from, &transition.event)) {
                return Err(BuildError::AmbiguousTransition {
                    from: transition.from.clone(),
                    event: transition.event.clone(),
                });
            }
        }

        Ok(Machine {
            current: self.initial,
            transitions: self.transitions,
            prompt: self.prompt,
            history: TransitionHistory::new(),
        })
    }
}
