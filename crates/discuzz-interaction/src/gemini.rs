//! GeminiGateway - direct REST implementation against the Gemini API.
//!
//! Structured stages (interview, profile) are constrained with a response
//! schema and `application/json` output; the delegate stage runs as plain
//! text under a system instruction.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use async_trait::async_trait;

use crate::config::secrets;
use crate::gateway::{GatewayError, GenerationGateway, GenerationOutcome, GenerationRequest};
use crate::prompts;
use crate::schema;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gateway implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGateway {
    /// Creates a new gateway with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads configuration from `~/.config/discuzz/secret.json`.
    ///
    /// Model name defaults to `gemini-2.5-flash` if not specified.
    pub fn try_from_secrets() -> Result<Self, GatewayError> {
        let config = secrets::load()
            .map_err(GatewayError::Transport)?
            .gemini
            .ok_or_else(|| {
                GatewayError::Transport("Gemini configuration not found in secret.json".into())
            })?;
        let model = config
            .model_name
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into());
        Ok(Self::new(config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint base, for tests against a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        match request {
            GenerationRequest::Interview { draft } => GenerateContentRequest {
                contents: vec![Content::user(prompts::interview_prompt(draft))],
                system_instruction: None,
                generation_config: Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: Some(json!({
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    })),
                }),
            },
            GenerationRequest::Profile {
                draft,
                interview_history,
            } => GenerateContentRequest {
                contents: vec![Content::user(prompts::profile_prompt(
                    draft,
                    interview_history,
                ))],
                system_instruction: None,
                generation_config: Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: Some(json!({
                        "type": "OBJECT",
                        "properties": {
                            "intent": { "type": "STRING", "description": "The primary goal of the post" },
                            "tone": { "type": "STRING", "description": "The emotional nuance" },
                            "assumptions": { "type": "STRING", "description": "Underlying premises" },
                            "audience": { "type": "STRING", "description": "Target demographic" },
                            "coreArgument": { "type": "STRING", "description": "The central thesis in one sentence" }
                        },
                        "required": ["intent", "tone", "assumptions", "audience", "coreArgument"]
                    })),
                }),
            },
            GenerationRequest::Delegate {
                original_post,
                profile,
                user_query,
                chat_history,
            } => GenerateContentRequest {
                contents: vec![Content::user(prompts::delegate_user_prompt(
                    user_query,
                    chat_history,
                ))],
                system_instruction: Some(Content::system(prompts::delegate_system_instruction(
                    original_post,
                    profile,
                ))),
                generation_config: None,
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GatewayError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self.client.post(url).json(body).send().await.map_err(|err| {
            if err.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(format!("Gemini API request failed: {err}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            GatewayError::MalformedOutput(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GatewayError> {
        let body = Self::build_request(request);
        let text = self.send_request(&body).await?;

        match request {
            GenerationRequest::Interview { .. } => {
                let value: Value = serde_json::from_str(&text)?;
                Ok(GenerationOutcome::Questions(schema::parse_questions(
                    &value,
                )?))
            }
            GenerationRequest::Profile { .. } => {
                let value: Value = serde_json::from_str(&text)?;
                Ok(GenerationOutcome::Profile(schema::parse_profile(&value)?))
            }
            GenerationRequest::Delegate { .. } => {
                Ok(GenerationOutcome::Reply(schema::parse_reply(&text)?))
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text }],
        }
    }

    fn system(text: String) -> Self {
        Self {
            role: "system".to_string(),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, GatewayError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            GatewayError::MalformedOutput(
                "Gemini API returned no text in the response candidates".to_string(),
            )
        })
}

fn map_http_error(status: StatusCode, body: String) -> GatewayError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GatewayError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discuzz_core::ContextProfile;

    #[test]
    fn interview_request_constrains_output_to_a_string_array() {
        let request = GenerationRequest::Interview {
            draft: "my draft".to_string(),
        };
        let body = GeminiGateway::build_request(&request);
        let config = body.generation_config.expect("schema-constrained");
        assert_eq!(config.response_mime_type, "application/json");
        assert_eq!(config.response_schema.unwrap()["type"], "ARRAY");
    }

    #[test]
    fn profile_schema_requires_all_five_fields() {
        let request = GenerationRequest::Profile {
            draft: "d".to_string(),
            interview_history: vec![],
        };
        let body = GeminiGateway::build_request(&request);
        let required = body.generation_config.unwrap().response_schema.unwrap()["required"].clone();
        let required: Vec<String> = serde_json::from_value(required).unwrap();
        assert_eq!(
            required,
            ["intent", "tone", "assumptions", "audience", "coreArgument"]
        );
    }

    #[test]
    fn delegate_request_uses_system_instruction() {
        let request = GenerationRequest::Delegate {
            original_post: "post".to_string(),
            profile: ContextProfile::fallback("post"),
            user_query: "why?".to_string(),
            chat_history: vec![],
        };
        let body = GeminiGateway::build_request(&request);
        assert!(body.generation_config.is_none());
        let instruction = body.system_instruction.expect("persona instruction");
        assert_eq!(instruction.role, "system");
        assert!(instruction.parts[0].text.contains("AI Delegate"));
    }

    #[test]
    fn http_error_extracts_vendor_message() {
        let body = r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());
        match err {
            GatewayError::Status { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: quota");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
