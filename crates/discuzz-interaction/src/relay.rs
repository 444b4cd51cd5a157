//! RelayGateway - client for the hosted generation endpoints.
//!
//! Used when generation runs behind the product's own server routes
//! (`/ai/interview`, `/ai/context-profile`, `/ai/delegate`) rather than
//! against a vendor API directly. The relay holds the vendor key server-side;
//! an optional bearer credential identifies the calling user and its absence
//! is tolerated (anonymous compose still completes).

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use async_trait::async_trait;

use discuzz_core::{ContextProfile, ConversationMessage};

use crate::gateway::{GatewayError, GenerationGateway, GenerationOutcome, GenerationRequest};
use crate::schema;

/// Gateway implementation that forwards requests to relay endpoints.
#[derive(Clone)]
pub struct RelayGateway {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl RelayGateway {
    /// Creates a new gateway against the given endpoint base
    /// (e.g. `https://api.discuzz.ai`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            bearer_token: None,
        }
    }

    /// Attaches the calling user's credential.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn endpoint(&self, request: &GenerationRequest) -> String {
        let path = match request {
            GenerationRequest::Interview { .. } => "/ai/interview",
            GenerationRequest::Profile { .. } => "/ai/context-profile",
            GenerationRequest::Delegate { .. } => "/ai/delegate",
        };
        format!("{}{path}", self.base_url)
    }

    async fn post(&self, url: &str, body: &impl Serialize) -> Result<Value, GatewayError> {
        let mut builder = self.client.post(url).json(body);
        if let Some(token) = &self.bearer_token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(format!("relay request failed: {err}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read relay error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response.json().await.map_err(|err| {
            GatewayError::MalformedOutput(format!("Failed to parse relay response: {err}"))
        })
    }
}

#[async_trait]
impl GenerationGateway for RelayGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GatewayError> {
        let url = self.endpoint(request);

        match request {
            GenerationRequest::Interview { draft } => {
                let body = self.post(&url, &InterviewBody { draft }).await?;
                match body.get("questions") {
                    Some(value) => Ok(GenerationOutcome::Questions(schema::parse_questions(
                        value,
                    )?)),
                    None => Err(GatewayError::MissingField("questions")),
                }
            }
            GenerationRequest::Profile {
                draft,
                interview_history,
            } => {
                let body = self
                    .post(
                        &url,
                        &ProfileBody {
                            draft,
                            interview_history,
                        },
                    )
                    .await?;
                match body.get("profile") {
                    Some(value) => Ok(GenerationOutcome::Profile(schema::parse_profile(value)?)),
                    None => Err(GatewayError::MissingField("profile")),
                }
            }
            GenerationRequest::Delegate {
                original_post,
                profile,
                user_query,
                chat_history,
            } => {
                let body = self
                    .post(
                        &url,
                        &DelegateBody {
                            original_post,
                            profile,
                            user_query,
                            chat_history,
                        },
                    )
                    .await?;
                match body.get("response").and_then(Value::as_str) {
                    Some(text) => Ok(GenerationOutcome::Reply(schema::parse_reply(text)?)),
                    None => Err(GatewayError::MissingField("response")),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct InterviewBody<'a> {
    draft: &'a str,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    draft: &'a str,
    interview_history: &'a [ConversationMessage],
}

#[derive(Serialize)]
struct DelegateBody<'a> {
    original_post: &'a str,
    profile: &'a ContextProfile,
    user_query: &'a str,
    chat_history: &'a [ConversationMessage],
}

fn map_http_error(status: StatusCode, body: String) -> GatewayError {
    GatewayError::Status {
        status: status.as_u16(),
        message: body,
    }
}
