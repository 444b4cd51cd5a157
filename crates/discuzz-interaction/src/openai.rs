//! OpenAiGateway - OpenAI-compatible Chat Completions implementation.
//!
//! This API cannot return a bare JSON array under `json_object` response
//! format, so the structured stages ask for the wrapped shapes
//! (`{"questions": [...]}`, `{"profile": {...}}`); the shared schema layer
//! accepts both, which keeps the outward contract identical to the other
//! gateways.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use async_trait::async_trait;

use crate::config::secrets;
use crate::gateway::{GatewayError, GenerationGateway, GenerationOutcome, GenerationRequest};
use crate::prompts;
use crate::schema;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Gateway implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGateway {
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
    /// Model name defaults to `gpt-4o` if not specified.
    pub fn try_from_secrets() -> Result<Self, GatewayError> {
        let config = secrets::load()
            .map_err(GatewayError::Transport)?
            .openai
            .ok_or_else(|| {
                GatewayError::Transport("OpenAI configuration not found in secret.json".into())
            })?;
        let model = config
            .model_name
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
        Ok(Self::new(config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint, for OpenAI-compatible providers or tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        match request {
            GenerationRequest::Interview { draft } => ChatCompletionRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage::user(format!(
                    "{}\n\nRespond with a JSON object of the form {{\"questions\": [...]}}.",
                    prompts::interview_prompt(draft)
                ))],
                response_format: Some(ResponseFormat::json_object()),
            },
            GenerationRequest::Profile {
                draft,
                interview_history,
            } => ChatCompletionRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage::user(format!(
                    "{}\n\nRespond with a JSON object with the keys intent, tone, assumptions, audience, coreArgument, all strings.",
                    prompts::profile_prompt(draft, interview_history)
                ))],
                response_format: Some(ResponseFormat::json_object()),
            },
            GenerationRequest::Delegate {
                original_post,
                profile,
                user_query,
                chat_history,
            } => ChatCompletionRequest {
                model: self.model.clone(),
                messages: vec![
                    ChatMessage::system(prompts::delegate_system_instruction(
                        original_post,
                        profile,
                    )),
                    ChatMessage::user(prompts::delegate_user_prompt(user_query, chat_history)),
                ],
                response_format: None,
            },
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(format!("OpenAI API request failed: {err}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            GatewayError::MalformedOutput(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationGateway for OpenAiGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GatewayError> {
        let body = self.build_request(request);
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
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    fn system(content: String) -> Self {
        Self {
            role: "system".to_string(),
            content,
        }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    r#type: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            GatewayError::MalformedOutput(
                "OpenAI API returned no content in the response".to_string(),
            )
        })
}

fn map_http_error(status: StatusCode, body: String) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());

    GatewayError::Status {
        status: status.as_u16(),
        message,
    }
}
