//! Intent resolution integration tests
//!
//! Drives both resolution paths against a scripted reasoning service and
//! checks what is sent and what comes back.

mod common;

use common::{transport_failure, ScriptedService};
use serde_json::json;
use taif::actions::CapabilityRegistry;
use taif::command::{IntentResolution, IntentResolver, Route};
use taif::core::config::AgentConfig;
use taif::core::error::TaifError;
use taif::llm::prompts::fallback_analysis;
use taif::llm::{PromptContext, ReasoningResponse};

fn context() -> PromptContext {
    PromptContext::from_registry(&CapabilityRegistry::builtin().unwrap())
}

fn config() -> AgentConfig {
    AgentConfig {
        model: "single-model".into(),
        thinker_model: "thinker-model".into(),
        formatter_model: "formatter-model".into(),
        ..AgentConfig::default()
    }
}

#[tokio::test]
async fn test_single_stage_well_formed_descriptor() {
    let service = ScriptedService::replying(&[r#"{"action": "ls", "parameters": {"path": "/tmp"}}"#]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let resolution = resolver.resolve("list the files in /tmp", Route::SingleStage).await.unwrap();

    let descriptor = resolution.descriptor().expect("should match");
    assert_eq!(descriptor.action, "ls");
    assert_eq!(descriptor.parameters.get("path"), Some(&json!("/tmp")));

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model_id, "single-model");
    assert!(requests[0].require_structured_output);
    assert!(requests[0].system_context.contains("ls"));
}

#[tokio::test]
async fn test_single_stage_malformed_output_is_error() {
    let service = ScriptedService::replying(&["I think you want to list files"]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("list files", Route::SingleStage).await.unwrap_err();
    assert!(matches!(err, TaifError::MalformedIntent(_)));
}

#[tokio::test]
async fn test_single_stage_wrong_shape_is_error() {
    let service = ScriptedService::replying(&[r#"{"action": 42, "parameters": {}}"#]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("list files", Route::SingleStage).await.unwrap_err();
    assert!(matches!(err, TaifError::MalformedIntent(_)));
}

#[tokio::test]
async fn test_null_document_is_no_match() {
    let service = ScriptedService::replying(&["null"]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let resolution = resolver.resolve("what is the meaning of life", Route::SingleStage).await.unwrap();
    assert_eq!(resolution, IntentResolution::NoMatch);
}

#[tokio::test]
async fn test_single_stage_transport_failure_is_llm_error() {
    let service = ScriptedService::new(vec![transport_failure()]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("list files", Route::SingleStage).await.unwrap_err();
    assert!(matches!(err, TaifError::LlmError(_)));
}

#[tokio::test]
async fn test_dual_stage_routes_models_and_embeds_analysis() {
    let service = ScriptedService::replying(&[
        "The user wants to copy every python file from src to backup.",
        r#"{"action": "copy", "parameters": {"src": "src", "dst": "backup", "files": ["*.py"]}}"#,
    ]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let resolution = resolver
        .resolve("copy all python files from src to backup", Route::DualStage)
        .await
        .unwrap();
    assert_eq!(resolution.descriptor().map(|d| d.action.as_str()), Some("copy"));

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model_id, "thinker-model");
    assert!(!requests[0].require_structured_output);
    assert_eq!(requests[1].model_id, "formatter-model");
    assert!(requests[1].require_structured_output);
    assert!(requests[1]
        .user_text
        .contains("copy every python file from src to backup"));
}

#[tokio::test]
async fn test_dual_stage_thinker_failure_uses_fallback_analysis() {
    let service = ScriptedService::new(vec![
        transport_failure(),
        ReasoningResponse::Text(r#"{"action": "pwd", "parameters": {}}"#.into()),
    ]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let instruction = "where am I right now in the file system";
    let resolution = resolver.resolve(instruction, Route::DualStage).await.unwrap();
    assert_eq!(resolution.descriptor().map(|d| d.action.as_str()), Some("pwd"));

    let requests = service.requests();
    assert_eq!(requests.len(), 2, "formatter must still be called");
    assert!(requests[1].user_text.contains(&fallback_analysis(instruction)));
}

#[tokio::test]
async fn test_dual_stage_timeout_text_counts_as_thinker_failure() {
    let service = ScriptedService::replying(&[
        "Request timeout while generating",
        "null",
    ]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let resolution = resolver.resolve("do something odd", Route::DualStage).await.unwrap();
    assert_eq!(resolution, IntentResolution::NoMatch);
    assert!(service.requests()[1]
        .user_text
        .contains(&fallback_analysis("do something odd")));
}

#[tokio::test]
async fn test_dual_stage_malformed_formatter_output_is_error() {
    let service = ScriptedService::replying(&["analysis", "{not json"]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("list files", Route::DualStage).await.unwrap_err();
    assert!(matches!(err, TaifError::MalformedIntent(_)));
}

#[tokio::test]
async fn test_dual_stage_formatter_transport_failure_is_llm_error() {
    let service = ScriptedService::new(vec![
        ReasoningResponse::Text("The user wants to list the current directory.".into()),
        transport_failure(),
    ]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("list files", Route::DualStage).await.unwrap_err();
    assert!(matches!(err, TaifError::LlmError(ref msg) if msg.contains("Failed to communicate")));
    assert_eq!(service.requests().len(), 2);
}

#[tokio::test]
async fn test_json_inside_prose_is_malformed() {
    let service = ScriptedService::replying(&[
        r#"Sure! {"action": "delete", "parameters": {"src": "notes.txt"}} Done."#,
    ]);
    let context = context();
    let resolver = IntentResolver::new(&service, &context, &config());

    let err = resolver.resolve("remove notes", Route::SingleStage).await.unwrap_err();
    assert!(matches!(err, TaifError::MalformedIntent(_)));
}
