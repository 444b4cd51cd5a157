//! Shape validation for generator output.
//!
//! The backends are non-deterministic and occasionally noncompliant, so
//! every structured response is validated here before a typed value crosses
//! the gateway boundary. Both bare shapes and the wrapped forms produced by
//! JSON-object-only backends (`{"questions": [...]}`, `{"profile": {...}}`)
//! are accepted.

use serde_json::Value;

use discuzz_core::ContextProfile;

use crate::gateway::GatewayError;

const PROFILE_FIELDS: [&str; 5] = ["intent", "tone", "assumptions", "audience", "coreArgument"];

/// Parses an ordered list of question strings.
pub fn parse_questions(value: &Value) -> Result<Vec<String>, GatewayError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(GatewayError::MalformedOutput(
                    "'questions' is not an array".to_string(),
                ))
            }
            None => return Err(GatewayError::MissingField("questions")),
        },
        _ => {
            return Err(GatewayError::MalformedOutput(format!(
                "expected a JSON array of strings, got {value}"
            )))
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                GatewayError::MalformedOutput("question list contains a non-string".to_string())
            })
        })
        .collect()
}

/// Parses a five-field context profile object.
pub fn parse_profile(value: &Value) -> Result<ContextProfile, GatewayError> {
    let object = match value {
        Value::Object(map) if map.contains_key("profile") => &map["profile"],
        other => other,
    };

    let map = object.as_object().ok_or_else(|| {
        GatewayError::MalformedOutput(format!("expected a profile object, got {object}"))
    })?;

    for field in PROFILE_FIELDS {
        match map.get(field) {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(GatewayError::MalformedOutput(format!(
                    "profile field '{field}' is not a string"
                )))
            }
            None => return Err(GatewayError::MissingField(field)),
        }
    }

    let profile = serde_json::from_value(object.clone())?;
    Ok(profile)
}

/// Parses a non-empty delegate reply.
pub fn parse_reply(text: &str) -> Result<String, GatewayError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::EmptyReply);
    }
    Ok(trimmed.to_string())
}
