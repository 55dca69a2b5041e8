//! Macros for declaring the states and events of a project type.

/// Declare `State` constants.
///
/// # Example
///
/// ```
/// use phaseflow::states;
///
/// states! {
///     pub PLANNING = "Planning";
///     pub EXECUTING = "Executing";
///     /// Terminal state.
///     pub DONE = "Done";
/// }
///
/// assert_eq!(PLANNING.as_str(), "Planning");
/// assert_ne!(EXECUTING, DONE);
/// ```
#[macro_export]
macro_rules! states {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $value:literal
        );* $(;)?
    ) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::core::State = $crate::core::State::from_static($value);
        )*
    };
}

/// Declare `Event` constants.
///
/// ```
/// use phaseflow::events;
///
/// events! {
///     pub SUBMIT = "submit_for_review";
///     pub REVIEW_PASS = "review_pass";
/// }
///
/// assert_eq!(SUBMIT.to_string(), "submit_for_review");
/// ```
#[macro_export]
macro_rules! events {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $value:literal
        );* $(;)?
    ) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::core::Event = $crate::core::Event::from_static($value);
        )*
    };
}
