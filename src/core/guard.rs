//! Guard predicates for controlling state transitions.
//!
//! Guards are side-effect free boolean functions over an execution context.
//! They are evaluated before a transition fires and must return the same
//! answer for the same context snapshot.

use std::fmt;
use std::sync::Arc;

type Predicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// Pure predicate that determines if a transition can fire.
///
/// A guard may carry a human-readable description. The description is
/// reported when the guard blocks a transition, so it should read as the
/// precondition the user has to satisfy.
///
/// # Example
///
/// ```rust
/// use phaseflow::core::Guard;
///
/// struct Review {
///     approved: bool,
/// }
///
/// let guard = Guard::described("review approved", |r: &Review| r.approved);
///
/// assert!(guard.check(&Review { approved: true }));
/// assert!(!guard.check(&Review { approved: false }));
/// assert_eq!(guard.description(), Some("review approved"));
/// ```
pub struct Guard<C> {
    predicate: Predicate<C>,
    description: Option<String>,
}

impl<C> Guard<C> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
            description: None,
        }
    }

    /// Create a guard with a description that is reported when it blocks.
    pub fn described<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
            description: Some(description.into()),
        }
    }

    /// Evaluate the guard against a context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }

    /// Human-readable precondition, if one was given.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            description: self.description.clone(),
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
