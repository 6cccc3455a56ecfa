mod common;

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use common::{error_name, node, session};
use jsonedit::{Direction, EditResult, SandboxState, SearchOutcome, Session};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    scenario: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    document: String,
    #[serde(default)]
    step: Vec<Step>,
    expect: Expect,
}

#[derive(Debug, Deserialize)]
struct Step {
    op: String,
    arg: Option<String>,
    error: Option<String>,
    buffer: Option<String>,
    selection: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Expect {
    document: String,
    selection: String,
    sandbox: Option<String>,
    can_undo: Option<bool>,
    can_redo: Option<bool>,
}

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scenarios.toml")
}

fn load_scenarios() -> Vec<Scenario> {
    let path = fixtures_path();
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    let file: ScenarioFile =
        toml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path));
    file.scenario
}

fn arg<'a>(scenario: &str, step: &'a Step) -> &'a str {
    step.arg
        .as_deref()
        .unwrap_or_else(|| panic!("{scenario}: op {} needs an arg", step.op))
}

fn search_result(outcome: SearchOutcome) -> EditResult<()> {
    match outcome {
        SearchOutcome::Found { .. } => Ok(()),
        other => panic!("expected a match, got {other:?}"),
    }
}

fn run_step(name: &str, s: &mut Session, step: &Step) -> EditResult<()> {
    match step.op.as_str() {
        "focus" => s.focus_pointer(arg(name, step)).map(|_| ()),
        "open" => s.open_sandbox().map(|_| ()),
        "edit" => s.edit(arg(name, step)),
        "commit" => s.commit(),
        "cancel" => s.cancel(),
        "insert" => s.insert_sibling(step.arg.as_deref().map(node)),
        "duplicate" => s.duplicate(),
        "raise" => s.raise(),
        "lower" => s.lower(),
        "rename" => s.rename(arg(name, step)),
        "delete" => s.delete(),
        "reorder-up" => s.reorder(Direction::Up),
        "reorder-down" => s.reorder(Direction::Down),
        "undo" => s.undo(),
        "redo" => s.redo(),
        "search" => search_result(s.search(arg(name, step))),
        "repeat-search" => search_result(s.repeat_search()),
        other => panic!("{name}: unknown op {other:?}"),
    }
}

#[test]
fn scenarios_replay_from_fixtures() {
    let scenarios = load_scenarios();
    assert!(!scenarios.is_empty(), "no scenarios in {:?}", fixtures_path());

    for sc in &scenarios {
        let mut s = session(&sc.document);
        for (i, step) in sc.step.iter().enumerate() {
            let before = s.root().clone();
            let result = run_step(&sc.name, &mut s, step);
            match (&step.error, result) {
                (None, Ok(())) => {}
                (None, Err(err)) => panic!("{} step {i} ({}): unexpected error: {err}", sc.name, step.op),
                (Some(expected), Ok(())) => {
                    panic!("{} step {i} ({}): expected {expected} error", sc.name, step.op)
                }
                (Some(expected), Err(err)) => {
                    assert_eq!(error_name(&err), expected.as_str(), "{} step {i} ({})", sc.name, step.op);
                    assert_eq!(s.root(), &before, "{} step {i}: failed op changed the document", sc.name);
                }
            }
            if let Some(buffer) = &step.buffer {
                assert_eq!(s.sandbox().buffer(), Some(buffer.as_str()), "{} step {i} buffer", sc.name);
            }
            if let Some(selection) = &step.selection {
                assert_eq!(&s.selection().to_pointer(), selection, "{} step {i} selection", sc.name);
            }
            assert!(
                s.root().contains_path(s.selection()),
                "{} step {i}: selection {} does not resolve",
                sc.name,
                s.selection()
            );
        }

        let expect = &sc.expect;
        assert_eq!(s.root(), &node(&expect.document), "{}: document", sc.name);
        assert_eq!(s.selection().to_pointer(), expect.selection, "{}: selection", sc.name);
        if let Some(state) = &expect.sandbox {
            let actual = match s.sandbox().state() {
                SandboxState::Idle => "idle",
                SandboxState::Editing => "editing",
                SandboxState::Committing => "committing",
            };
            assert_eq!(actual, state.as_str(), "{}: sandbox state", sc.name);
        }
        if let Some(can_undo) = expect.can_undo {
            assert_eq!(s.can_undo(), can_undo, "{}: can_undo", sc.name);
        }
        if let Some(can_redo) = expect.can_redo {
            assert_eq!(s.can_redo(), can_redo, "{}: can_redo", sc.name);
        }
    }
}

#[test]
fn scenario_names_are_unique() {
    let scenarios = load_scenarios();
    let mut names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    let total = names.len();
    names.dedup();
    assert_eq!(names.len(), total, "duplicate scenario names");
}
