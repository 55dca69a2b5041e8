//! Side-effecting callbacks attached to transitions, and prompt generators.

use super::state::State;
use std::error::Error as StdError;
use std::sync::Arc;

/// Error type returned by user-supplied callbacks.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Function run when a transition enters its target state or leaves its
/// source state.
///
/// Actions may mutate the context. Persistence happens after the
/// in-memory transition, not atomically with it, so an action must be safe
/// to run again after a crash-and-retry.
pub type Action<C> = Arc<dyn Fn(&mut C) -> Result<(), BoxError> + Send + Sync>;

/// Produces the guidance text for the machine's current state.
pub type PromptFunc<C> = Arc<dyn Fn(&State, &C) -> String + Send + Sync>;

/// Wrap a closure as an [`Action`].
///
/// # Example
///
/// ```rust
/// use phaseflow::core::action;
///
/// let bump = action(|n: &mut u32| {
///     *n += 1;
///     Ok(())
/// });
///
/// let mut count = 0;
/// bump(&mut count).unwrap();
/// assert_eq!(count, 1);
/// ```
pub fn action<C, F>(f: F) -> Action<C>
where
    F: Fn(&mut C) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`PromptFunc`].
pub fn prompt_fn<C, F>(f: F) -> PromptFunc<C>
where
    F: Fn(&State, &C) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}
