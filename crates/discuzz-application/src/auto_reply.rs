//! Public delegate auto-reply.
//!
//! When a reader comments on a post, the author's delegate answers in the
//! open thread. The reply is an ordinary [`Comment`] flagged as
//! AI-authored and linked to the comment that triggered it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use discuzz_core::{Comment, ContextGenerator, ConversationMessage, MessageRole, Post};

/// Produces public delegate replies to reader comments.
pub struct AutoReplyService {
    generator: Arc<dyn ContextGenerator>,
}

impl AutoReplyService {
    pub fn new(generator: Arc<dyn ContextGenerator>) -> Self {
        Self { generator }
    }

    /// Generates the delegate's reply to `trigger` within `thread`.
    ///
    /// The thread up to the trigger becomes the chat history; earlier
    /// delegate replies count as model turns, everything else as user
    /// turns. A blank trigger produces no reply and no generator call.
    pub async fn reply_to(
        &self,
        post: &Post,
        thread: &[Comment],
        trigger: &Comment,
    ) -> Option<Comment> {
        let query = trigger.content.trim();
        if query.is_empty() {
            return None;
        }

        let history: Vec<ConversationMessage> = thread
            .iter()
            .filter(|comment| comment.id != trigger.id)
            .map(|comment| {
                let role = if comment.is_ai_response {
                    MessageRole::Model
                } else {
                    MessageRole::User
                };
                ConversationMessage::new(comment.id.clone(), role, comment.content.clone())
            })
            .collect();

        tracing::debug!(post_id = %post.id, trigger_id = %trigger.id, "delegate auto-reply");
        let reply = self
            .generator
            .delegate_response(&post.content, &post.context_profile, query, &history)
            .await;

        Some(Comment {
            id: Uuid::new_v4().to_string(),
            author_name: format!("{} (AI Delegate)", post.author_name),
            author_handle: post.author_handle.clone(),
            avatar_url: post.avatar_url.clone(),
            content: reply,
            timestamp: Utc::now(),
            is_ai_response: true,
            reply_to_id: Some(trigger.id.clone()),
        })
    }
}
