//! Standard Plan/Execute/Review Workflow
//!
//! This example drives a project through implementation and review, failing
//! the first review and passing the second.
//!
//! Key concepts:
//! - Phases bound to start and end states
//! - Guards that read phase outputs (approved task list, settled tasks)
//! - An N-way branch on the review assessment
//! - The rework loop: a failed review reopens implementation with a new iteration
//!
//! Run with: cargo run --example standard_workflow

use phaseflow::config::{
    branch_on, when, with_end_state, with_failed_phase, with_guard, with_outputs,
    with_start_state, with_tasks, InitialInputs, ProjectTypeConfigBuilder,
};
use phaseflow::{events, states, Artifact, Project, ProjectState, ProjectTypeConfig, Registry};

states! {
    PLANNING = "ImplementationPlanning";
    EXECUTING = "ImplementationExecuting";
    REVIEWING = "ReviewActive";
    DONE = "Done";
}

events! {
    START_EXECUTION = "start_execution";
    SUBMIT = "submit_for_review";
    REVIEW_PASS = "review_pass";
    REVIEW_FAIL = "review_fail";
}

// Discriminator: the assessment of the latest approved review
fn assessment(project: &ProjectState) -> String {
    project
        .phase("review")
        .and_then(|review| review.latest_output("review"))
        .filter(|review| review.approved)
        .and_then(|review| review.metadata.get("assessment"))
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

fn standard_type() -> Result<ProjectTypeConfig, phaseflow::BuildError> {
    ProjectTypeConfigBuilder::new("standard")
        .initial_state(PLANNING)
        .add_phase(
            "implementation",
            [
                with_start_state(PLANNING),
                with_end_state(EXECUTING),
                with_outputs(["task_list"]),
                with_tasks(),
            ],
        )
        .add_phase(
            "review",
            [
                with_start_state(REVIEWING),
                with_end_state(REVIEWING),
                with_outputs(["review"]),
            ],
        )
        .add_phase("finalize", [with_start_state(DONE), with_end_state(DONE)])
        .add_transition(
            PLANNING,
            EXECUTING,
            START_EXECUTION,
            [with_guard("task list approved", |p: &ProjectState| {
                p.phase("implementation")
                    .is_some_and(|phase| phase.has_approved_output("task_list"))
            })],
        )
        .add_transition(
            EXECUTING,
            REVIEWING,
            SUBMIT,
            [with_guard("all tasks settled", |p: &ProjectState| {
                p.phase("implementation")
                    .is_some_and(|phase| phase.all_tasks_settled())
            })],
        )
        .add_branch(
            REVIEWING,
            [
                branch_on(assessment),
                when("pass", REVIEW_PASS, DONE, []),
                when("fail", REVIEW_FAIL, PLANNING, [with_failed_phase("review")]),
            ],
        )
        .on_advance(PLANNING, |_| Ok(START_EXECUTION))
        .on_advance(EXECUTING, |_| Ok(SUBMIT))
        .set_prompt(PLANNING, |p| {
            format!("Plan the work for '{}' and get the task list approved", p.name)
        })
        .set_prompt(REVIEWING, |_| "Review the implementation".to_string())
        .build()
}

fn submit_review(project: &mut Project, verdict: &str) {
    println!("  [Review] submitting assessment '{}'", verdict);
    project.project_mut().phase_entry("review").outputs.push(
        Artifact::new("review", "review.md")
            .approved()
            .with_metadata("assessment", verdict),
    );
}

fn print_phases(project: &Project) {
    for (name, phase) in &project.project().phases {
        println!(
            "    {:<15} {:<12} iteration {}",
            name,
            phase.status.as_str(),
            phase.iteration
        );
    }
}

fn step(project: &mut Project) -> Result<(), phaseflow::AdvanceError> {
    let from = project.state().clone();
    let event = project.advance()?;
    println!("  {} --{}--> {}", from, event, project.state());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Standard Workflow Example ===\n");

    let mut registry = Registry::new();
    registry.register(standard_type()?)?;
    let mut project = registry.create("standard", "auth-service", InitialInputs::new())?;

    println!("Created project at {}", project.state());
    println!("  Prompt: {}", project.prompt());
    print_phases(&project);

    // Advancing without an approved task list is blocked by the guard
    println!("\nAttempting to advance without a task list:");
    match project.advance() {
        Ok(event) => println!("  unexpectedly fired {}", event),
        Err(err) => println!("  Blocked ({:?}): {}", err.kind(), err),
    }

    println!("\nFirst pass:");
    project
        .project_mut()
        .phase_entry("implementation")
        .outputs
        .push(Artifact::new("task_list", "tasks.md").approved());
    step(&mut project)?;
    step(&mut project)?;
    submit_review(&mut project, "fail");
    step(&mut project)?;
    print_phases(&project);

    println!("\nSecond pass:");
    step(&mut project)?;
    step(&mut project)?;
    submit_review(&mut project, "pass");
    step(&mut project)?;
    print_phases(&project);

    println!("\nEvents fired:");
    for event in project.history().events() {
        println!("  - {}", event);
    }

    println!("\nKey Takeaways:");
    println!("- Guards block advancement until phase outputs are approved");
    println!("- Branches route on project data rather than caller input");
    println!("- A failed review reopens implementation as iteration 2");

    Ok(())
}
