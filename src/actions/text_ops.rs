//! Operations that pass file contents through the reasoning backend

use super::context::OpContext;
use super::params::Params;
use super::{OpError, OpResult};
use std::fs;
use std::path::Path;

const SUMMARY_SYSTEM: &str =
    "You write concise natural language summaries of documents. Never answer in JSON.";

const REWRITE_SYSTEM: &str =
    "You rewrite documents as instructed. Reply with the rewritten document only.";

fn read_file(path: &Path) -> OpResult<String> {
    if !path.exists() {
        return Err(OpError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(OpError::NotAFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| OpError::io(format!("Error reading {}", path.display()), e))
}

fn summary_prompt(content: &str, max_words: Option<i64>) -> String {
    let mut prompt = format!(
        "Please provide a concise, natural language summary of the following content. \
Focus on the main points and key information.\n\nContent to summarize:\n{}\n\n\
Please provide a summary in natural language (not JSON format):",
        content
    );
    if let Some(max) = max_words.filter(|m| *m > 0) {
        prompt.push_str(&format!("\n\nPlease keep the summary under {} words.", max));
    }
    prompt
}

pub fn summarize(params: &Params, ctx: &OpContext<'_>) -> OpResult<String> {
    let file = params.required_path("file")?;
    let content = read_file(file)?;
    let prompt = summary_prompt(&content, params.integer("max_length"));
    ctx.ask(params.text("model"), SUMMARY_SYSTEM, prompt)
}

/// Rewrites `file` per `prompt` and saves the answer to `output`
///
/// Nothing is written when the backend call fails.
pub fn rewrite(params: &Params, ctx: &OpContext<'_>) -> OpResult<String> {
    let file = params.required_path("file")?;
    let instruction = params.required_text("prompt")?;
    let output = params.required_path("output")?;

    let content = read_file(file)?;
    let rewritten = ctx.ask(
        params.text("model"),
        REWRITE_SYSTEM,
        format!("{}\n\n---\n\n{}", instruction, content),
    )?;

    fs::write(output, rewritten)
        .map_err(|e| OpError::io(format!("Error writing to {}", output.display()), e))?;
    Ok(format!("Rewritten file saved to {}", output.display()))
}
