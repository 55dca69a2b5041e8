//! Persist and Resume
//!
//! This example saves a project between sessions and resumes it from disk.
//!
//! Key concepts:
//! - `ProjectState` is plain serde data; the machine is rebuilt on load
//! - Atomic writes (temp file, then rename) prevent corrupt state files
//! - `Registry::load` binds saved data back to its registered project type
//! - Phase statuses and iterations survive the round trip
//!
//! Run with: cargo run --example persist_resume

use phaseflow::config::{
    with_end_state, with_guard, with_start_state, InitialInputs, ProjectTypeConfigBuilder,
};
use phaseflow::{events, states, Artifact, Project, ProjectState, ProjectTypeConfig, Registry};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

states! {
    DRAFTING = "Drafting";
    REVIEWING = "Reviewing";
    PUBLISHED = "Published";
}

events! {
    SUBMIT = "submit";
    PUBLISH = "publish";
}

fn article_type() -> Result<ProjectTypeConfig, phaseflow::BuildError> {
    ProjectTypeConfigBuilder::new("article")
        .initial_state(DRAFTING)
        .add_phase("draft", [with_start_state(DRAFTING), with_end_state(DRAFTING)])
        .add_phase("review", [with_start_state(REVIEWING), with_end_state(REVIEWING)])
        .add_phase("publish", [with_start_state(PUBLISHED), with_end_state(PUBLISHED)])
        .add_transition(
            DRAFTING,
            REVIEWING,
            SUBMIT,
            [with_guard("draft approved", |p: &ProjectState| {
                p.phase("draft")
                    .is_some_and(|phase| phase.has_approved_output("draft"))
            })],
        )
        .add_transition(REVIEWING, PUBLISHED, PUBLISH, [])
        .on_advance(DRAFTING, |_| Ok(SUBMIT))
        .on_advance(REVIEWING, |_| Ok(PUBLISH))
        .build()
}

// Store for saved project states, one JSON file per project
struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    fn new(dir: PathBuf) -> Result<Self, Box<dyn Error>> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn save(&self, project: &Project) -> Result<PathBuf, Box<dyn Error>> {
        let state = project.project();
        let path = self.path_for(&state.name);
        let json = serde_json::to_string_pretty(state)?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        println!("  [Store] Saved '{}' at {}", state.name, state.current_state());
        Ok(path)
    }

    fn read(&self, path: &Path) -> Result<ProjectState, Box<dyn Error>> {
        let json = fs::read_to_string(path)?;
        let state: ProjectState = serde_json::from_str(&json)?;
        println!("  [Store] Loaded '{}' at {}", state.name, state.current_state());
        Ok(state)
    }
}

fn print_phases(project: &Project) {
    for (name, phase) in &project.project().phases {
        println!("    {:<8} {}", name, phase.status.as_str());
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Persist and Resume Example ===\n");

    let mut registry = Registry::new();
    registry.register(article_type()?)?;
    let store = StateStore::new(std::env::temp_dir().join("phaseflow-states"))?;

    // Session 1: draft, submit, then stop
    println!("Session 1: new project");
    println!("----------------------------------------");
    let mut project = registry.create("article", "release-notes", InitialInputs::new())?;
    project
        .project_mut()
        .phase_entry("draft")
        .outputs
        .push(Artifact::new("draft", "notes.md").approved());
    let event = project.advance()?;
    println!("  Fired {} -> now at {}", event, project.state());
    print_phases(&project);
    let saved = store.save(&project)?;
    drop(project);
    println!("  [INTERRUPT] Session ended.\n");

    // Session 2: reload from disk and continue
    println!("Session 2: resume");
    println!("----------------------------------------");
    let state = store.read(&saved)?;
    let mut project = registry.load(state)?;
    println!("  Permitted events: {:?}", project.permitted_events());
    let event = project.advance()?;
    println!("  Fired {} -> now at {}", event, project.state());
    print_phases(&project);
    project.validate()?;
    store.save(&project)?;

    // Cleanup
    fs::remove_dir_all(&store.dir).ok();

    println!("\nKey Takeaways:");
    println!("- Only project data is persisted; the state machine is rebuilt on load");
    println!("- Atomic writes keep a saved state readable after a crash");
    println!("- The registry resolves the project type recorded in the saved data");

    Ok(())
}
