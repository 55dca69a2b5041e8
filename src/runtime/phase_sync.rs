//! Coarse phase-status bookkeeping driven by machine transitions.

use crate::config::ProjectTypeConfig;
use crate::core::{Event, State};
use crate::project::{PhaseStatus, ProjectState};
use chrono::Utc;

/// Update phase statuses after `from --event--> to` has fired.
///
/// Applied in order:
/// 1. leaving the end state of a phase toward another phase completes it;
/// 2. the transition's failed phase, if any, is marked failed instead;
/// 3. entering a phase's start state opens it, bumping the iteration when
///    the phase had already ended. A phase this transition just failed is
///    left failed; it reopens on its next entry.
pub(crate) fn sync_phases(
    config: &ProjectTypeConfig,
    project: &mut ProjectState,
    from: &State,
    to: &State,
    event: &Event,
) {
    let now = Utc::now();
    let failed_phase = config
        .transition(from, to, event)
        .and_then(|t| t.failed_phase());
    let old_phase = config.phase_for_state(from);
    let new_phase = config.phase_for_state(to);

    if let Some(old) = old_phase {
        let leaving = new_phase.is_none_or(|new| new.name() != old.name());
        if leaving && old.end_state() == from && failed_phase != Some(old.name()) {
            let state = project.phase_entry(old.name());
            state.status = PhaseStatus::Completed;
            state.completed_at = Some(now);
            tracing::debug!(phase = old.name(), "phase completed");
        }
    }

    if let Some(name) = failed_phase {
        let state = project.phase_entry(name);
        state.status = PhaseStatus::Failed;
        state.failed_at = Some(now);
        tracing::debug!(phase = name, event = %event, "phase failed");
    }

    if let Some(new) = new_phase {
        if new.start_state() == to && from != to && failed_phase != Some(new.name()) {
            let state = project.phase_entry(new.name());
            if state.status.is_terminal() {
                state.iteration += 1;
            } else {
                state.iteration = state.iteration.max(1);
            }
            state.status = PhaseStatus::InProgress;
            state.started_at.get_or_insert(now);
            tracing::debug!(phase = new.name(), iteration = state.iteration, "phase started");
        }
    }
}
