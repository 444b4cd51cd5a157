//! Private delegate chat.
//!
//! One session per opened post. The session owns its visible message
//! history and talks to the generator through [`ContextGenerator`], so a
//! backend outage surfaces as an apology message rather than an error.

use std::sync::Arc;

use uuid::Uuid;

use discuzz_core::{ContextGenerator, ConversationMessage, MessageRole, Post};

/// A reader's one-on-one conversation with a post's delegate.
///
/// `send` takes `&mut self`, so a session can only run one exchange at a
/// time; history is snapshotted before the generator call and mutated only
/// after it returns, so a cancelled call leaves no half-recorded turn.
pub struct DelegateChatSession {
    post: Post,
    generator: Arc<dyn ContextGenerator>,
    messages: Vec<ConversationMessage>,
}

impl DelegateChatSession {
    /// Opens a session, seeding the delegate's greeting.
    pub fn new(post: Post, generator: Arc<dyn ContextGenerator>) -> Self {
        let greeting = ConversationMessage::new(
            "intro",
            MessageRole::Model,
            format!(
                "Hey, I'm {}'s AI delegate. Ask me anything about this post or their perspective.",
                post.author_name
            ),
        );
        Self {
            post,
            generator,
            messages: vec![greeting],
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    /// The visible chat history, greeting included.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Sends a reader query and records both sides of the exchange.
    ///
    /// A blank query is dropped without reaching the generator; `None`
    /// signals that nothing was recorded.
    pub async fn send(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        tracing::debug!(post_id = %self.post.id, "delegate chat query");
        let history = self.messages.clone();
        let reply = self
            .generator
            .delegate_response(&self.post.content, &self.post.context_profile, query, &history)
            .await;

        self.messages.push(ConversationMessage::new(
            Uuid::new_v4().to_string(),
            MessageRole::User,
            query,
        ));
        self.messages.push(ConversationMessage::new(
            Uuid::new_v4().to_string(),
            MessageRole::Model,
            reply.clone(),
        ));
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_post, RecordingGenerator};

    #[tokio::test]
    async fn session_opens_with_the_delegate_greeting() {
        let generator = Arc::new(RecordingGenerator::replying("ok"));
        let session = DelegateChatSession::new(sample_post("Sam Rivera"), generator);

        assert_eq!(session.messages().len(), 1);
        let greeting = &session.messages()[0];
        assert_eq!(greeting.role, MessageRole::Model);
        assert_eq!(
            greeting.content,
            "Hey, I'm Sam Rivera's AI delegate. Ask me anything about this post or their perspective."
        );
    }

    #[tokio::test]
    async fn send_records_query_and_reply_in_order() {
        let generator = Arc::new(RecordingGenerator::replying("Because the data says so."));
        let mut session = DelegateChatSession::new(sample_post("Sam"), generator.clone());

        let reply = session.send("Why do you think that?").await;
        assert_eq!(reply.as_deref(), Some("Because the data says so."));

        let roles: Vec<MessageRole> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::Model, MessageRole::User, MessageRole::Model]
        );
        assert_eq!(session.messages()[1].content, "Why do you think that?");

        let calls = generator.delegate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "Why do you think that?");
        // the history passed to the generator predates the new user turn
        assert_eq!(calls[0].history_len, 1);
    }

    #[tokio::test]
    async fn blank_query_never_reaches_the_generator() {
        let generator = Arc::new(RecordingGenerator::replying("ok"));
        let mut session = DelegateChatSession::new(sample_post("Sam"), generator.clone());

        assert!(session.send("   \n ").await.is_none());
        assert_eq!(session.messages().len(), 1);
        assert!(generator.delegate_calls().is_empty());
    }

    #[tokio::test]
    async fn query_is_trimmed_before_recording() {
        let generator = Arc::new(RecordingGenerator::replying("ok"));
        let mut session = DelegateChatSession::new(sample_post("Sam"), generator);

        session.send("  what about costs?  ").await;
        assert_eq!(session.messages()[1].content, "what about costs?");
    }
}
