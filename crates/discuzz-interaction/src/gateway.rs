//! The generation gateway boundary.
//!
//! One normalized contract for all three pipeline stages, regardless of
//! which backend serves them. Backends must never leak transport details
//! past this boundary: every failure path produces a typed [`GatewayError`]
//! that the pipeline converts into a stage-specific fallback.

use async_trait::async_trait;
use thiserror::Error;

use discuzz_core::{ContextProfile, ConversationMessage};

/// A task-specific generation request.
///
/// `Delegate::chat_history` is expected to already be truncated to the
/// bounded context window by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Produce clarifying questions for a raw draft.
    Interview { draft: String },
    /// Synthesize a context profile from draft plus interview transcript.
    Profile {
        draft: String,
        interview_history: Vec<ConversationMessage>,
    },
    /// Answer a reader query as the author's delegate.
    Delegate {
        original_post: String,
        profile: ContextProfile,
        user_query: String,
        chat_history: Vec<ConversationMessage>,
    },
}

impl GenerationRequest {
    /// Stage name, used for logging and endpoint routing.
    pub fn stage(&self) -> &'static str {
        match self {
            GenerationRequest::Interview { .. } => "interview",
            GenerationRequest::Profile { .. } => "profile",
            GenerationRequest::Delegate { .. } => "delegate",
        }
    }
}

/// Schema-validated output of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Questions(Vec<String>),
    Profile(ContextProfile),
    Reply(String),
}

/// Classified gateway failure.
///
/// Transport and malformed-output failures are treated identically by
/// callers (same fallback path); the distinction exists for operators.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network-level failure before an HTTP status was obtained.
    #[error("generation request failed: {0}")]
    Transport(String),

    /// Non-2xx response from the backend.
    #[error("generation backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The bounded wait elapsed before the backend answered.
    #[error("generation request timed out")]
    Timeout,

    /// The response body could not be parsed into the expected shape.
    #[error("malformed generator output: {0}")]
    MalformedOutput(String),

    /// A required field was absent from otherwise well-formed output.
    #[error("generator output missing required field '{0}'")]
    MissingField(&'static str),

    /// The backend answered with an empty reply where text was required.
    #[error("generation backend returned an empty reply")]
    EmptyReply,
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedOutput(err.to_string())
    }
}

/// A backend able to serve the three generation stages.
///
/// Implementations: [`crate::GeminiGateway`], [`crate::OpenAiGateway`],
/// [`crate::RelayGateway`]. No idempotence is guaranteed; identical
/// requests may yield different outputs.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GatewayError>;
}
