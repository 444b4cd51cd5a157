//! The context pipeline: stage contracts with fallback substitution.
//!
//! Wraps any [`GenerationGateway`] and turns its typed failures into the
//! product's fixed fallbacks, so the compose flow and delegate controllers
//! never branch on errors. Every call is bounded by a timeout; a hung
//! backend is a failure like any other.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use discuzz_core::{
    ContextGenerator, ContextProfile, ConversationMessage, DELEGATE_HISTORY_WINDOW,
    DELEGATE_NO_CONTEXT_REPLY, DELEGATE_UNAVAILABLE_REPLY, FALLBACK_QUESTIONS,
};

use crate::gateway::{GatewayError, GenerationGateway, GenerationOutcome, GenerationRequest};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback-applying implementation of [`ContextGenerator`].
#[derive(Clone)]
pub struct ContextPipeline {
    gateway: Arc<dyn GenerationGateway>,
    timeout: Duration,
}

impl ContextPipeline {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            gateway,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the bounded wait applied to every gateway call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call(&self, request: GenerationRequest) -> Result<GenerationOutcome, GatewayError> {
        let stage = request.stage();
        match tokio::time::timeout(self.timeout, self.gateway.generate(&request)).await {
            Ok(Ok(outcome)) => {
                tracing::info!(stage, "generation completed");
                Ok(outcome)
            }
            Ok(Err(err)) => {
                tracing::error!(stage, error = %err, "generation failed");
                Err(err)
            }
            Err(_) => {
                tracing::error!(stage, timeout = ?self.timeout, "generation timed out");
                Err(GatewayError::Timeout)
            }
        }
    }

    fn fallback_questions() -> Vec<String> {
        FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect()
    }
}

#[async_trait]
impl ContextGenerator for ContextPipeline {
    async fn interview_questions(&self, draft: &str) -> Vec<String> {
        if draft.trim().is_empty() {
            tracing::warn!("interview requested for a blank draft, using fallback questions");
            return Self::fallback_questions();
        }

        let request = GenerationRequest::Interview {
            draft: draft.to_string(),
        };
        match self.call(request).await {
            Ok(GenerationOutcome::Questions(questions)) => questions,
            Ok(_) | Err(_) => {
                tracing::warn!("substituting fallback interview questions");
                Self::fallback_questions()
            }
        }
    }

    async fn context_profile(
        &self,
        draft: &str,
        interview_history: &[ConversationMessage],
    ) -> ContextProfile {
        let request = GenerationRequest::Profile {
            draft: draft.to_string(),
            interview_history: interview_history.to_vec(),
        };
        match self.call(request).await {
            Ok(GenerationOutcome::Profile(profile)) => profile,
            Ok(_) | Err(_) => {
                tracing::warn!("substituting fallback context profile");
                ContextProfile::fallback(draft)
            }
        }
    }

    async fn delegate_response(
        &self,
        original_post: &str,
        profile: &ContextProfile,
        user_query: &str,
        chat_history: &[ConversationMessage],
    ) -> String {
        let window_start = chat_history.len().saturating_sub(DELEGATE_HISTORY_WINDOW);
        let request = GenerationRequest::Delegate {
            original_post: original_post.to_string(),
            profile: profile.clone(),
            user_query: user_query.to_string(),
            chat_history: chat_history[window_start..].to_vec(),
        };
        match self.call(request).await {
            Ok(GenerationOutcome::Reply(reply)) => reply,
            Ok(_) => {
                tracing::warn!("delegate stage returned a non-reply outcome");
                DELEGATE_UNAVAILABLE_REPLY.to_string()
            }
            Err(GatewayError::EmptyReply) => DELEGATE_NO_CONTEXT_REPLY.to_string(),
            Err(_) => DELEGATE_UNAVAILABLE_REPLY.to_string(),
        }
    }
}
