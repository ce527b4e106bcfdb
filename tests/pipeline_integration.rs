//! End-to-end pipeline tests
//!
//! Instruction in, result string out, with a scripted reasoning service
//! standing in for the backend and a temporary working directory.

mod common;

use common::{transport_failure, ScriptedService};
use std::fs;
use taif::actions::CapabilityRegistry;
use taif::command::{Agent, Outcome, ResolutionMode, Route, NO_MATCH_MESSAGE};
use taif::core::config::AgentConfig;
use taif::llm::ReasoningResponse;
use tempfile::TempDir;

fn agent_in(dir: &TempDir, service: ScriptedService) -> Agent<ScriptedService> {
    let config = AgentConfig {
        workdir: Some(dir.path().to_path_buf()),
        ..AgentConfig::default()
    };
    Agent::new(config, CapabilityRegistry::builtin().unwrap(), service).unwrap()
}

#[test]
fn test_show_contents_of_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "abc").unwrap();
    let service = ScriptedService::replying(&[r#"{"action": "cat", "parameters": {"path": "notes.txt"}}"#]);
    let agent = agent_in(&dir, service);

    assert_eq!(agent.route("Show contents of notes.txt"), Route::SingleStage);
    let outcome = agent.handle("Show contents of notes.txt");
    assert!(outcome.is_success());
    assert_eq!(outcome.message(), "abc");
    assert_eq!(agent.service().requests().len(), 1);
}

#[test]
fn test_complex_instruction_takes_dual_stage() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("a.py"), "").unwrap();
    let service = ScriptedService::replying(&[
        "Copy python files from src into backup when present.",
        r#"{"action": "copy", "parameters": {"src": "src", "dst": "backup", "files": ["*.py"]}}"#,
    ]);
    let agent = agent_in(&dir, service);

    let instruction = "if there are any *.py files in src, copy them to backup";
    assert_eq!(agent.route(instruction), Route::DualStage);
    let outcome = agent.handle(instruction);
    assert!(outcome.is_success(), "{}", outcome.message());
    assert!(dir.path().join("backup").join("a.py").exists());
    assert_eq!(agent.service().requests().len(), 2);
}

#[test]
fn test_forced_mode_overrides_classifier() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(&dir, ScriptedService::replying(&["analysis", "null"]))
        .with_mode(ResolutionMode::ForceDual);

    assert_eq!(agent.route("pwd"), Route::DualStage);
    assert_eq!(agent.handle("pwd"), Outcome::NoMatch);
    assert_eq!(agent.service().requests().len(), 2);
}

#[test]
fn test_no_match_message() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(&dir, ScriptedService::replying(&["null"]));

    let outcome = agent.handle("sing me a song");
    assert_eq!(outcome, Outcome::NoMatch);
    assert_eq!(outcome.message(), NO_MATCH_MESSAGE);
}

#[test]
fn test_malformed_output_maps_to_no_match() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(&dir, ScriptedService::replying(&["sure, listing files now"]));

    assert_eq!(agent.handle("list files"), Outcome::NoMatch);
}

#[test]
fn test_empty_instruction_skips_backend() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(&dir, ScriptedService::unreachable());

    assert_eq!(agent.handle("   "), Outcome::NoMatch);
    assert!(agent.service().requests().is_empty());
}

#[test]
fn test_backend_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(&dir, ScriptedService::new(vec![transport_failure()]));

    match agent.handle("list files") {
        Outcome::Failed(reason) => assert!(reason.contains("Failed to communicate")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_dual_stage_formatter_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let service = ScriptedService::new(vec![
        ReasoningResponse::Text("The user wants a directory listing.".into()),
        transport_failure(),
    ]);
    let agent = agent_in(&dir, service).with_mode(ResolutionMode::ForceDual);

    match agent.handle("list files") {
        Outcome::Failed(reason) => assert!(reason.contains("Failed to communicate")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(agent.service().requests().len(), 2);
}

#[test]
fn test_summarize_uses_backend_during_dispatch() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "Meeting moved to Friday at noon.").unwrap();
    let service = ScriptedService::replying(&[
        r#"{"action": "summarize", "parameters": {"file": "notes.txt"}}"#,
        "The meeting is now on Friday at noon.",
    ]);
    let agent = agent_in(&dir, service);

    let outcome = agent.handle("summarize notes.txt");
    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(outcome.message(), "The meeting is now on Friday at noon.");

    let requests = agent.service().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].require_structured_output);
    assert!(!requests[1].require_structured_output);
    assert_eq!(requests[1].model_id, agent.config().model);
    assert!(requests[1].user_text.contains("Meeting moved to Friday at noon."));
}

#[test]
fn test_rewrite_writes_output_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("draft.txt"), "gonna be late").unwrap();
    let service = ScriptedService::replying(&[
        r#"{"action": "rewrite", "parameters": {"file": "draft.txt", "prompt": "Make it polite", "output": "polite.txt"}}"#,
        "I apologise, I will be running late.",
    ]);
    let agent = agent_in(&dir, service).with_mode(ResolutionMode::ForceSingle);

    let outcome = agent.handle("rewrite draft.txt politely into polite.txt");
    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(
        fs::read_to_string(dir.path().join("polite.txt")).unwrap(),
        "I apologise, I will be running late."
    );
    assert!(agent.service().requests()[1]
        .user_text
        .starts_with("Make it polite\n\n---\n\ngonna be late"));
}

#[test]
fn test_unknown_action_from_backend_is_rejected() {
    let dir = TempDir::new().unwrap();
    let agent = agent_in(
        &dir,
        ScriptedService::replying(&[r#"{"action": "format_disk", "parameters": {}}"#]),
    );

    match agent.handle("wipe everything") {
        Outcome::Executed(result) => {
            assert!(!result.success);
            assert!(result.output.contains("Unknown action"));
        }
        other => panic!("expected a rejected dispatch, got {:?}", other),
    }
}

#[test]
fn test_invalid_config_rejected() {
    let config = AgentConfig {
        timeout_secs: 0,
        ..AgentConfig::default()
    };
    let result = Agent::new(
        config,
        CapabilityRegistry::builtin().unwrap(),
        ScriptedService::unreachable(),
    );
    assert!(result.is_err());
}
