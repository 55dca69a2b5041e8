//! End-to-end project lifecycles driven through `Project::advance`.

use phaseflow::config::{
    branch_on, when, with_end_state, with_failed_phase, with_guard, with_inputs, with_outputs,
    with_start_state, with_tasks, InitialInputs, ProjectTypeConfigBuilder,
};
use phaseflow::{
    events, states, AdvanceError, AdvanceErrorKind, Artifact, PhaseStatus, Project,
    ProjectState, ProjectTypeConfig, Registry,
};
use std::sync::Arc;

states! {
    START = "Start";
    MIDDLE = "Middle";
    END = "End";

    PLANNING = "ImplementationPlanning";
    EXECUTING = "ImplementationExecuting";
    REVIEW_ACTIVE = "ReviewActive";
    REWORK = "Rework";
    DONE = "Done";
}

events! {
    GO = "go";
    FINISH = "finish";

    START_EXECUTION = "start_execution";
    SUBMIT = "submit_for_review";
    REVIEW_PASS = "review_pass";
    REVIEW_FAIL = "review_fail";
}

fn linear_type() -> Arc<ProjectTypeConfig> {
    let config = ProjectTypeConfigBuilder::new("linear")
        .initial_state(START)
        .add_phase("p", [with_start_state(START), with_end_state(START)])
        .add_phase("q", [with_start_state(MIDDLE), with_end_state(END)])
        .add_transition(
            START,
            MIDDLE,
            GO,
            [with_guard("first output of p approved", |p: &ProjectState| {
                p.phase("p")
                    .and_then(|phase| phase.outputs.first())
                    .is_some_and(|artifact| artifact.approved)
            })],
        )
        .add_transition(MIDDLE, END, FINISH, [])
        .on_advance(START, |_| Ok(GO))
        .build()
        .unwrap();
    Arc::new(config)
}

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

/// Planning -> Executing -> Review, with review routing back to planning
/// on failure.
fn standard_type(rework_target: phaseflow::State) -> ProjectTypeConfig {
    ProjectTypeConfigBuilder::new("standard")
        .initial_state(PLANNING)
        .add_phase(
            "implementation",
            [
                with_start_state(PLANNING),
                with_end_state(EXECUTING),
                with_inputs(["context", "review"]),
                with_outputs(["task_list"]),
                with_tasks(),
            ],
        )
        .add_phase(
            "review",
            [
                with_start_state(REVIEW_ACTIVE),
                with_end_state(REVIEW_ACTIVE),
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
            REVIEW_ACTIVE,
            SUBMIT,
            [with_guard("all tasks settled", |p: &ProjectState| {
                p.phase("implementation")
                    .is_some_and(|phase| phase.all_tasks_settled())
            })],
        )
        .add_branch(
            REVIEW_ACTIVE,
            [
                branch_on(assessment),
                when("pass", REVIEW_PASS, DONE, []),
                when(
                    "fail",
                    REVIEW_FAIL,
                    rework_target,
                    [with_failed_phase("review")],
                ),
            ],
        )
        .on_advance(PLANNING, |_| Ok(START_EXECUTION))
        .on_advance(EXECUTING, |_| Ok(SUBMIT))
        .build()
        .unwrap()
}

fn submit_review(project: &mut Project, verdict: &str) {
    project
        .project_mut()
        .phase_entry("review")
        .outputs
        .push(
            Artifact::new("review", "review.md")
                .approved()
                .with_metadata("assessment", verdict),
        );
}

#[test]
fn unapproved_output_blocks_then_approval_advances() {
    let config = linear_type();
    let state = config.create_project("linear", InitialInputs::new()).unwrap();
    let mut project = Project::new(config, state).unwrap();
    project
        .project_mut()
        .phase_entry("p")
        .outputs
        .push(Artifact::new("plan", "plan.md"));

    let err = project.advance().unwrap_err();
    assert!(matches!(err, AdvanceError::Blocked { .. }));
    assert!(err.to_string().contains("cannot fire event 'go' from state 'Start'"));
    assert_eq!(project.state(), &START);

    project.project_mut().phase_entry("p").outputs[0].approved = true;
    assert_eq!(project.advance().unwrap(), GO);
    assert_eq!(project.state(), &MIDDLE);
}

#[test]
fn failing_review_routes_to_rework_and_fails_phase() {
    let mut registry = Registry::new();
    registry.register(standard_type(REWORK)).unwrap();
    let state = ProjectState::new("auth", "standard", REVIEW_ACTIVE);
    let mut project = registry.load(state).unwrap();
    submit_review(&mut project, "fail");

    assert_eq!(project.advance().unwrap(), REVIEW_FAIL);

    assert_eq!(project.state(), &REWORK);
    assert_eq!(
        project.project().phase("review").unwrap().status,
        PhaseStatus::Failed
    );
}

#[test]
fn unrecognised_assessment_is_an_error() {
    let mut registry = Registry::new();
    registry.register(standard_type(REWORK)).unwrap();
    let mut project = registry
        .load(ProjectState::new("auth", "standard", REVIEW_ACTIVE))
        .unwrap();
    submit_review(&mut project, "other");

    let err = project.advance().unwrap_err();

    assert_eq!(err.kind(), AdvanceErrorKind::Configuration);
    assert!(err.to_string().contains("'other'"));
    assert_eq!(project.state(), &REVIEW_ACTIVE);
}

#[test]
fn missing_review_is_not_yet_decidable() {
    let mut registry = Registry::new();
    registry.register(standard_type(REWORK)).unwrap();
    let mut project = registry
        .load(ProjectState::new("auth", "standard", REVIEW_ACTIVE))
        .unwrap();

    assert!(project.advance().is_err());
    assert_eq!(project.state(), &REVIEW_ACTIVE);
}

#[test]
fn rework_loop_passes_on_second_review() {
    let mut registry = Registry::new();
    registry.register(standard_type(PLANNING)).unwrap();
    let mut project = registry
        .create("standard", "auth", InitialInputs::new())
        .unwrap();

    // First pass: plan, execute, fail review.
    project
        .project_mut()
        .phase_entry("implementation")
        .outputs
        .push(Artifact::new("task_list", "tasks.md").approved());
    assert_eq!(project.advance().unwrap(), START_EXECUTION);
    assert_eq!(project.advance().unwrap(), SUBMIT);
    submit_review(&mut project, "fail");
    assert_eq!(project.advance().unwrap(), REVIEW_FAIL);

    assert_eq!(project.state(), &PLANNING);
    let implementation = project.project().phase("implementation").unwrap();
    assert_eq!(implementation.status, PhaseStatus::InProgress);
    assert_eq!(implementation.iteration, 2);
    assert_eq!(
        project.project().phase("review").unwrap().status,
        PhaseStatus::Failed
    );

    // Second pass: the task list is still approved, the new review passes.
    assert_eq!(project.advance().unwrap(), START_EXECUTION);
    assert_eq!(project.advance().unwrap(), SUBMIT);
    assert_eq!(
        project.project().phase("review").unwrap().iteration,
        2
    );
    submit_review(&mut project, "pass");
    assert_eq!(project.advance().unwrap(), REVIEW_PASS);

    assert_eq!(project.state(), &DONE);
    assert_eq!(
        project.project().phase("review").unwrap().status,
        PhaseStatus::Completed
    );
    assert_eq!(
        project.project().phase("finalize").unwrap().status,
        PhaseStatus::InProgress
    );

    let events: Vec<&str> = project
        .history()
        .events()
        .into_iter()
        .map(|e| e.as_str())
        .collect();
    assert_eq!(
        events,
        vec![
            "start_execution",
            "submit_for_review",
            "review_fail",
            "start_execution",
            "submit_for_review",
            "review_pass"
        ]
    );
}

#[test]
fn phase_status_round_trip() {
    let config = linear_type();
    let state = config.create_project("linear", InitialInputs::new()).unwrap();
    let mut project = Project::new(config, state).unwrap();
    project
        .project_mut()
        .phase_entry("p")
        .outputs
        .push(Artifact::new("plan", "plan.md").approved());

    project.advance().unwrap();

    let p = project.project().phase("p").unwrap();
    assert_eq!(p.status, PhaseStatus::Completed);
    assert!(p.completed_at.is_some());
    let q = project.project().phase("q").unwrap();
    assert_eq!(q.status, PhaseStatus::InProgress);
    assert!(q.started_at.is_some());

    project.fire_with_phase_updates(&FINISH).unwrap();
    assert_eq!(
        project.project().phase("q").unwrap().status,
        PhaseStatus::InProgress
    );
}

#[test]
fn persisted_project_reloads_at_saved_state() {
    let mut registry = Registry::new();
    registry.register(standard_type(PLANNING)).unwrap();
    let mut project = registry
        .create("standard", "auth", InitialInputs::new())
        .unwrap();
    project
        .project_mut()
        .phase_entry("implementation")
        .outputs
        .push(Artifact::new("task_list", "tasks.md").approved());
    project.advance().unwrap();

    let json = serde_json::to_string(project.project()).unwrap();
    let restored: ProjectState = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, project.project());

    let mut reloaded = registry.load(restored).unwrap();
    assert_eq!(reloaded.state(), &EXECUTING);
    assert_eq!(reloaded.advance().unwrap(), SUBMIT);
    assert!(reloaded.validate().is_ok());
}

#[test]
fn serialized_state_uses_wire_names() {
    let config = linear_type();
    let state = config.create_project("linear", InitialInputs::new()).unwrap();

    let value = serde_json::to_value(&state).unwrap();

    assert_eq!(value["type"], "linear");
    assert_eq!(value["statechart"]["current_state"], "Start");
    assert_eq!(value["phases"]["p"]["status"], "in_progress");
    assert_eq!(value["phases"]["q"]["status"], "not_started");
}
