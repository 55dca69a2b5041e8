//! Core vocabulary shared by the machine and project-type layers.
//!
//! - `State` and `Event` identifiers
//! - Guard predicates and side-effecting actions
//! - Prompt generators
//! - Immutable transition history

mod action;
mod guard;
mod history;
mod state;

pub use action::{action, prompt_fn, Action, BoxError, PromptFunc};
pub use guard::Guard;
pub use history::{TransitionHistory, TransitionRecord};
pub use state::{Event, State};
