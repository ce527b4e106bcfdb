//! Prompt text for the single-stage and dual-stage resolvers

use crate::llm::context::PromptContext;

const JSON_SHAPE: &str = r#"{
  "action": "command_name",
  "parameters": {
    "param1": "value1",
    "param2": "value2"
  }
}"#;

const EXAMPLES: &str = r#"- "list files" -> {"action": "ls", "parameters": {"path": "."}}
- "show contents of file.txt" -> {"action": "cat", "parameters": {"path": "file.txt"}}
- "create folder backup" -> {"action": "mkdir", "parameters": {"path": "backup"}}
- "copy file.txt to backup/" -> {"action": "copy", "parameters": {"src": "file.txt", "dst": "backup/"}}
- "find all Python files" -> {"action": "locate", "parameters": {"pattern": "*.py"}}
- "search for 'error' in all .log files" -> {"action": "grep", "parameters": {"directory": ".", "pattern": "error", "files": ["*.log"]}}
- "delete file1.txt" -> {"action": "delete", "parameters": {"src": ".", "files": ["file1.txt"]}}
- "write 'Hello World' to newfile.txt" -> {"action": "write", "parameters": {"file": "newfile.txt", "content": "Hello World"}}
- "tell me what the readme contains" -> {"action": "cat", "parameters": {"path": "README.md"}}
- "summarize report.txt in 50 words" -> {"action": "summarize", "parameters": {"file": "report.txt", "max_length": 50}}
- "rewrite draft.md more formally to final.md" -> {"action": "rewrite", "parameters": {"file": "draft.md", "prompt": "Make it more formal", "output": "final.md"}}"#;

/// System context for structured (JSON-producing) requests
pub fn structured_system_prompt(context: &PromptContext) -> String {
    format!(
        r#"You are TAIF, an agent that maps natural language instructions to file system and process operations.

AVAILABLE ACTIONS (optional parameters in brackets):
{}

Respond with valid JSON only. No explanations, no markdown.

OUTPUT FORMAT:
{}

Examples:
{}

If the instruction does not match any available action, respond with null."#,
        context.summary(),
        JSON_SHAPE,
        EXAMPLES
    )
}

/// System context for the free-text analysis pass
pub const THINKER_SYSTEM_PROMPT: &str = "You analyze natural language instructions about files, \
directories and processes. Explain the intent in plain text; do not produce JSON.";

/// User message for single-stage resolution
pub fn single_stage_prompt(instruction: &str) -> String {
    format!(
        "User Instruction: \"{}\"\n\nReturn the JSON object for this instruction.",
        instruction
    )
}

/// User message for the thinker pass
pub fn thinker_prompt(instruction: &str) -> String {
    format!(
        r#"Analyze this user instruction and determine what action they want to perform.

User Instruction: "{}"

Think through this step by step:
1. What is the user trying to accomplish?
2. What type of file operation is this? (list, read, write, copy, move, delete, etc.)
3. What are the key parameters? (file paths, directories, content, etc.)
4. Are there any special conditions or filters?

Provide a clear analysis of the user's intent."#,
        instruction
    )
}

/// User message for the formatter pass
pub fn formatter_prompt(analysis: &str, instruction: &str, context: &PromptContext) -> String {
    format!(
        r#"Based on the analysis below, create a JSON response with the appropriate action and parameters.

Analysis: {}

Original User Instruction: "{}"

Available actions: {}

Return ONLY a valid JSON object in this format:
{}

If the instruction is unclear or doesn't match any available action, return null."#,
        analysis,
        instruction,
        context.action_list(),
        JSON_SHAPE
    )
}

/// Analysis substituted when the thinker cannot be reached
pub fn fallback_analysis(instruction: &str) -> String {
    format!(
        "Simple analysis: User wants to perform an operation related to '{}'",
        instruction
    )
}
