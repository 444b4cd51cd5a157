//! Shared test doubles for the service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use discuzz_core::{ContextGenerator, ContextProfile, ConversationMessage, Post};

/// One recorded delegate invocation.
pub struct DelegateCall {
    pub original_post: String,
    pub query: String,
    pub history_len: usize,
}

/// Generator double that records delegate calls and answers with a fixed
/// reply. The compose stages are unreachable from these services.
pub struct RecordingGenerator {
    reply: String,
    calls: Mutex<Vec<DelegateCall>>,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn delegate_calls(&self) -> Vec<DelegateCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

#[async_trait]
impl ContextGenerator for RecordingGenerator {
    async fn interview_questions(&self, _draft: &str) -> Vec<String> {
        unreachable!("delegate services never start interviews")
    }

    async fn context_profile(
        &self,
        _draft: &str,
        _interview_history: &[ConversationMessage],
    ) -> ContextProfile {
        unreachable!("delegate services never synthesize profiles")
    }

    async fn delegate_response(
        &self,
        original_post: &str,
        _profile: &ContextProfile,
        user_query: &str,
        chat_history: &[ConversationMessage],
    ) -> String {
        self.calls.lock().unwrap().push(DelegateCall {
            original_post: original_post.to_string(),
            query: user_query.to_string(),
            history_len: chat_history.len(),
        });
        self.reply.clone()
    }
}

pub fn sample_post(author_name: &str) -> Post {
    Post {
        id: "post-1".to_string(),
        author_name: author_name.to_string(),
        author_handle: "@sam".to_string(),
        avatar_url: Some("https://img.example/sam.png".to_string()),
        content: "Remote work erodes team culture.".to_string(),
        image_url: None,
        timestamp: Utc::now(),
        context_profile: ContextProfile {
            intent: "To provoke debate.".to_string(),
            tone: "Blunt".to_string(),
            assumptions: "Offices foster culture.".to_string(),
            audience: "Tech workers".to_string(),
            core_argument: "Remote work erodes team culture.".to_string(),
        },
        likes: 0,
        reply_count: 0,
        is_liked: false,
    }
}
