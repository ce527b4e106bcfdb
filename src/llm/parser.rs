//! Parse reasoning output into action descriptors
//!
//! The reasoning backend is non-deterministic, so its JSON is checked
//! against the `{action, parameters}` shape rather than trusted. A `null`
//! document, or one whose `action` is absent or null, means the
//! instruction matched nothing; anything else that does not fit the shape
//! is a malformed intent.

use crate::core::error::{Result, TaifError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured result of intent resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Action name, expected to exist in the capability registry
    pub action: String,
    /// Raw parameters, bound against the contract at dispatch time
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ActionDescriptor {
    pub fn new(action: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }
}

/// Parse a raw response into a descriptor, or `None` for "no match"
///
/// The response must be the JSON document itself. The only wrapping
/// accepted is a single fenced ```json block; JSON embedded in prose is
/// rejected.
pub fn parse_descriptor(response: &str) -> Result<Option<ActionDescriptor>> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(TaifError::MalformedIntent("Empty response".into()));
    }

    let document = extract_fenced_json(trimmed).unwrap_or(trimmed);
    let value: Value = serde_json::from_str(document).map_err(|e| {
        TaifError::MalformedIntent(format!(
            "Failed to parse intent: {} - Response: {}",
            e, response
        ))
    })?;

    descriptor_from_value(value)
}

/// Validate a JSON document against the descriptor shape
pub fn descriptor_from_value(value: Value) -> Result<Option<ActionDescriptor>> {
    let mut object = match value {
        Value::Null => return Ok(None),
        Value::Object(object) => object,
        other => {
            return Err(TaifError::MalformedIntent(format!(
                "Expected a JSON object, got: {}",
                other
            )))
        }
    };

    let action = match object.remove("action") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(other) => {
            return Err(TaifError::MalformedIntent(format!(
                "'action' must be a non-empty string, got: {}",
                other
            )))
        }
    };

    let parameters = match object.remove("parameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params,
        Some(other) => {
            return Err(TaifError::MalformedIntent(format!(
                "'parameters' must be an object, got: {}",
                other
            )))
        }
    };

    Ok(Some(ActionDescriptor { action, parameters }))
}

/// Body of a response that is exactly one ```json fenced block
pub fn extract_fenced_json(response: &str) -> Option<&str> {
    let body = response.strip_prefix("```json")?.strip_suffix("```")?;
    let body = body.trim();
    (!body.contains("```")).then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_extracted() {
        let response = "```json\n{\"action\": \"pwd\"}\n```";
        assert_eq!(extract_fenced_json(response), Some("{\"action\": \"pwd\"}"));
        let descriptor = parse_descriptor(response).unwrap().unwrap();
        assert_eq!(descriptor.action, "pwd");
    }

    #[test]
    fn test_unfenced_text_not_extracted() {
        assert_eq!(extract_fenced_json(r#"{"action": "ls"}"#), None);
        assert_eq!(extract_fenced_json("see ```json\n{}\n```"), None);
    }

    #[test]
    fn test_json_embedded_in_prose_rejected() {
        let response = r#"Here is the parsed command:
{"action": "delete", "parameters": {"src": "notes.txt"}}
Let me know if you need anything else."#;
        assert!(matches!(
            parse_descriptor(response),
            Err(TaifError::MalformedIntent(_))
        ));
    }

    #[test]
    fn test_parse_well_formed() {
        let descriptor = parse_descriptor(r#"{"action":"ls","parameters":{"path":"."}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.action, "ls");
        assert_eq!(&descriptor.parameters, json!({"path": "."}).as_object().unwrap());
    }

    #[test]
    fn test_parse_null_is_no_match() {
        assert_eq!(parse_descriptor("null").unwrap(), None);
        assert_eq!(parse_descriptor(r#"{"action": null}"#).unwrap(), None);
        assert_eq!(parse_descriptor(r#"{"parameters": {"path": "."}}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_missing_parameters_defaults_empty() {
        let descriptor = parse_descriptor(r#"{"action": "pwd"}"#).unwrap().unwrap();
        assert!(descriptor.parameters.is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        for bad in [
            "not json at all",
            r#"["ls"]"#,
            r#"{"action": 42}"#,
            r#"{"action": "ls", "parameters": "."}"#,
            "",
        ] {
            assert!(
                matches!(parse_descriptor(bad), Err(TaifError::MalformedIntent(_))),
                "accepted: {bad}"
            );
        }
    }
}
