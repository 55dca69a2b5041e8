//! Property-based tests for machines and project types.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use phaseflow::config::{
    branch_on, when, with_end_state, with_guard, with_on_entry, with_on_exit, with_start_state,
    BranchConfig, DeterminerError, InitialInputs, ProjectTypeConfigBuilder,
};
use phaseflow::core::{Event, Guard, State};
use phaseflow::machine::{MachineBuilder, MachineOption};
use phaseflow::{Project, ProjectState, ProjectTypeConfig};
use proptest::prelude::*;
use std::sync::Arc;

const REVIEW: State = State::from_static("Review");
const WAITING: State = State::from_static("Waiting");

prop_compose! {
    fn arbitrary_project()(
        count in 0..20i64,
        verdict in "[a-z]{0,6}",
    ) -> ProjectState {
        let mut project = ProjectState::new("prop", "branching", REVIEW);
        project.metadata.insert("count".to_string(), count.into());
        project.metadata.insert("verdict".to_string(), verdict.into());
        project
    }
}

fn verdict(project: &ProjectState) -> String {
    project.metadata_str("verdict").unwrap_or_default().to_string()
}

fn target(value: &str) -> State {
    State::new(format!("After_{value}"))
}

fn event(value: &str) -> Event {
    Event::new(format!("on_{value}"))
}

/// A branch at `Review` with one path per value.
fn branching_type(values: &[String]) -> ProjectTypeConfig {
    let mut options = vec![branch_on(verdict)];
    options.extend(
        values
            .iter()
            .map(|value| when(value.clone(), event(value), target(value), [])),
    );
    ProjectTypeConfigBuilder::new("branching")
        .initial_state(REVIEW)
        .add_branch(REVIEW, options)
        .build()
        .unwrap()
}

fn counting_type() -> Arc<ProjectTypeConfig> {
    let config = ProjectTypeConfigBuilder::new("counting")
        .initial_state(WAITING)
        .add_phase("wait", [with_start_state(WAITING), with_end_state(WAITING)])
        .add_phase("review", [with_start_state(REVIEW), with_end_state(REVIEW)])
        .add_transition(
            WAITING,
            REVIEW,
            Event::from_static("ready"),
            [with_guard("count is even", |p: &ProjectState| {
                p.metadata
                    .get("count")
                    .and_then(|c| c.as_i64())
                    .is_some_and(|c| c % 2 == 0)
            })],
        )
        .on_advance(WAITING, |_| Ok(Event::from_static("ready")))
        .build()
        .unwrap();
    Arc::new(config)
}

proptest! {
    #[test]
    fn guard_is_idempotent(project in arbitrary_project()) {
        let guard = Guard::new(|p: &ProjectState| verdict(p).len() > 2);
        let first = guard.check(&project);
        let second = guard.check(&project);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn advance_is_deterministic(mut project in arbitrary_project()) {
        let config = counting_type();
        project.project_type = "counting".to_string();
        project.statechart.current_state = WAITING;

        let a = Project::new(Arc::clone(&config), project.clone()).unwrap();
        let b = Project::new(Arc::clone(&config), project.clone()).unwrap();
        prop_assert_eq!(
            a.can_fire(&Event::from_static("ready")).unwrap(),
            b.can_fire(&Event::from_static("ready")).unwrap()
        );

        let mut a = a;
        let mut b = b;
        let first = a.advance().map_err(|e| e.to_string());
        let second = b.advance().map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
        prop_assert_eq!(a.state(), b.state());
    }

    #[test]
    fn configured_branch_values_yield_their_event(
        values in prop::collection::btree_set("[a-z]{1,6}", 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let values: Vec<String> = values.into_iter().collect();
        let config = branching_type(&values);
        let chosen = pick.get(&values);

        let mut project = ProjectState::new("prop", "branching", REVIEW);
        project.metadata.insert("verdict".to_string(), chosen.as_str().into());

        let determiner = config.determiner(&REVIEW).unwrap();
        prop_assert_eq!(determiner(&project).unwrap(), event(chosen));

        let mut live = Project::new(Arc::new(config), project).unwrap();
        prop_assert_eq!(live.advance().unwrap(), event(chosen));
        prop_assert_eq!(live.state(), &target(chosen));
    }

    #[test]
    fn unconfigured_branch_values_are_errors(
        values in prop::collection::btree_set("[a-z]{1,6}", 1..5),
        other in "[A-Z0-9]{0,6}",
    ) {
        let values: Vec<String> = values.into_iter().collect();
        let config = branching_type(&values);

        let mut project = ProjectState::new("prop", "branching", REVIEW);
        project.metadata.insert("verdict".to_string(), other.as_str().into());

        let determiner = config.determiner(&REVIEW).unwrap();
        let is_unmatched = matches!(
            determiner(&project),
            Err(DeterminerError::UnmatchedBranch { .. })
        );
        prop_assert!(is_unmatched);

        let mut live = Project::new(Arc::new(config), project).unwrap();
        prop_assert!(live.advance().is_err());
        prop_assert_eq!(live.state(), &REVIEW);
    }

    #[test]
    fn later_when_overrides_earlier(value in "[a-z]{1,6}", swap in any::<bool>()) {
        let (first, second) = if swap { ("x", "y") } else { ("y", "x") };
        let config = ProjectTypeConfigBuilder::new("branching")
            .initial_state(REVIEW)
            .add_branch(
                REVIEW,
                [
                    branch_on(verdict),
                    when(value.clone(), event(first), target(first), []),
                    when(value.clone(), event(second), target(second), []),
                ],
            )
            .build()
            .unwrap();

        let branch: &BranchConfig = config.branch(&REVIEW).unwrap();
        prop_assert_eq!(branch.paths().len(), 1);
        let path = branch.path(&value).unwrap();
        prop_assert_eq!(path.event(), &event(second));
        prop_assert_eq!(path.to(), &target(second));
        prop_assert_eq!(config.transitions().len(), 1);
    }

    #[test]
    fn failed_actions_leave_no_partial_transition(fail_exit in any::<bool>(), fail_entry in any::<bool>()) {
        prop_assume!(fail_exit || fail_entry);
        let config = ProjectTypeConfigBuilder::new("actions")
            .initial_state(WAITING)
            .add_phase("wait", [with_start_state(WAITING), with_end_state(WAITING)])
            .add_phase("review", [with_start_state(REVIEW), with_end_state(REVIEW)])
            .add_transition(
                WAITING,
                REVIEW,
                Event::from_static("ready"),
                [
                    with_on_exit(move |p: &mut ProjectState| {
                        p.metadata.insert("exited".to_string(), true.into());
                        if fail_exit {
                            return Err("exit failed".into());
                        }
                        Ok(())
                    }),
                    with_on_entry(move |p: &mut ProjectState| {
                        p.metadata.insert("entered".to_string(), true.into());
                        if fail_entry {
                            return Err("entry failed".into());
                        }
                        Ok(())
                    }),
                ],
            )
            .build()
            .unwrap();
        let config = Arc::new(config);
        let state = config.create_project("prop", InitialInputs::new()).unwrap();
        let before = state.clone();
        let mut project = Project::new(config, state).unwrap();

        prop_assert!(project.fire_with_phase_updates(&Event::from_static("ready")).is_err());
        prop_assert_eq!(project.state(), &WAITING);
        prop_assert_eq!(project.project(), &before);
        prop_assert!(project.history().is_empty());
    }

    #[test]
    fn machine_can_fire_never_mutates(words in 0..10u32) {
        let machine = MachineBuilder::new(WAITING)
            .add_transition(
                WAITING,
                REVIEW,
                Event::from_static("ready"),
                [MachineOption::guard(|w: &u32| *w > 4)],
            )
            .build()
            .unwrap();

        let first = machine.can_fire(&Event::from_static("ready"), &words).unwrap();
        let second = machine.can_fire(&Event::from_static("ready"), &words).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, words > 4);
        prop_assert_eq!(machine.state(), &WAITING);
    }
}
