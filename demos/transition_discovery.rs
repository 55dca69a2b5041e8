//! Transition Discovery
//!
//! This example shows how a caller inspects a project type before acting.
//!
//! Key concepts:
//! - Listing the transitions available from the current state
//! - Guard descriptions explain what a blocked transition requires
//! - `fire` runs a caller-chosen event instead of the determiner's choice
//! - Error kinds separate fixable data from configuration mistakes
//!
//! Run with: cargo run --example transition_discovery

use phaseflow::config::{
    with_description, with_end_state, with_failed_phase, with_guard, with_start_state,
    InitialInputs, ProjectTypeConfigBuilder,
};
use phaseflow::{events, states, AdvanceErrorKind, ProjectState, ProjectTypeConfig, Registry};
use std::sync::Arc;

states! {
    TRIAGE = "Triage";
    FIXING = "Fixing";
    VERIFYING = "Verifying";
    CLOSED = "Closed";
}

events! {
    ACCEPT = "accept";
    WONT_FIX = "wont_fix";
    VERIFY = "verify";
    REOPEN = "reopen";
    CLOSE = "close";
}

fn bug_type() -> Result<ProjectTypeConfig, phaseflow::BuildError> {
    ProjectTypeConfigBuilder::new("bug")
        .initial_state(TRIAGE)
        .add_phase("triage", [with_start_state(TRIAGE), with_end_state(TRIAGE)])
        .add_phase("fix", [with_start_state(FIXING), with_end_state(VERIFYING)])
        .add_phase("closed", [with_start_state(CLOSED), with_end_state(CLOSED)])
        .add_transition(
            TRIAGE,
            FIXING,
            ACCEPT,
            [
                with_guard("reproduction recorded", |p: &ProjectState| {
                    p.metadata_str("reproduction").is_some()
                }),
                with_description("Accept the bug and start fixing"),
            ],
        )
        .add_transition(
            TRIAGE,
            CLOSED,
            WONT_FIX,
            [with_description("Close without a fix")],
        )
        .add_transition(FIXING, VERIFYING, VERIFY, [])
        .add_transition(VERIFYING, TRIAGE, REOPEN, [with_failed_phase("fix")])
        .add_transition(VERIFYING, CLOSED, CLOSE, [])
        .on_advance(TRIAGE, |_| Ok(ACCEPT))
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Transition Discovery Example ===\n");

    let mut registry = Registry::new();
    let config: Arc<ProjectTypeConfig> = registry.register(bug_type()?)?;
    let mut project = registry.create("bug", "crash-on-save", InitialInputs::new())?;

    println!("Transitions from {}:", project.state());
    for info in project.available_transitions() {
        println!(
            "  {} -> {} : {} (requires: {})",
            info.event,
            info.to,
            info.description,
            info.guard_description.as_deref().unwrap_or("nothing")
        );
    }

    println!("\nAs JSON:");
    println!(
        "{}",
        serde_json::to_string_pretty(&project.available_transitions())?
    );

    // The determiner picks `accept`, whose guard is unmet
    println!("\nAdvancing:");
    match project.advance() {
        Err(err) if err.kind() == AdvanceErrorKind::Blocked => {
            println!("  Blocked: {}", err);
            println!(
                "  Target would be {:?}",
                config.target_state(project.state(), &ACCEPT)
            );
        }
        Err(err) => return Err(err.into()),
        Ok(event) => println!("  Fired {}", event),
    }

    project
        .project_mut()
        .metadata
        .insert("reproduction".to_string(), "open, edit, save".into());
    println!("  Can fire accept now: {}", project.can_fire(&ACCEPT)?);
    project.advance()?;
    println!("  Now at {}", project.state());

    // No determiner is registered past triage, so the caller picks events
    println!("\nFiring chosen events:");
    for event in [VERIFY, REOPEN, ACCEPT, VERIFY, CLOSE] {
        project.fire(&event)?;
        let fix = project.project().phase("fix").map(|p| (p.status, p.iteration));
        println!("  {} -> {} (fix phase: {:?})", event, project.state(), fix);
    }

    if let Err(err) = project.advance() {
        println!("\nAdvancing from {}: {:?}, {}", project.state(), err.kind(), err);
    }

    println!("\nKey Takeaways:");
    println!("- Transition listings carry descriptions and guard requirements");
    println!("- Blocked errors can be fixed by updating project data and retrying");
    println!("- Explicit events follow the same phase bookkeeping as advance");

    Ok(())
}
