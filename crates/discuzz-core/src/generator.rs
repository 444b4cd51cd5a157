//! Seam between the controllers and the generation backend.
//!
//! Controllers never branch on generator failure: every operation returns a
//! usable value, with the stage-specific fallback substituted below this
//! trait when the backend is unreachable or noncompliant.

use async_trait::async_trait;

use crate::message::ConversationMessage;
use crate::profile::ContextProfile;

/// Number of trailing chat-history entries supplied to the delegate.
/// Older turns are intentionally dropped.
pub const DELEGATE_HISTORY_WINDOW: usize = 5;

/// Generic clarifying questions used when interview generation fails.
pub const FALLBACK_QUESTIONS: [&str; 3] = [
    "What is your main goal with this post?",
    "Who is the specific target audience?",
    "What assumptions are you making that aren't stated?",
];

/// Delegate reply when generation itself is unavailable.
pub const DELEGATE_UNAVAILABLE_REPLY: &str = "I am unable to respond at this moment.";

/// Delegate reply when the backend produced nothing usable for the query.
pub const DELEGATE_NO_CONTEXT_REPLY: &str =
    "I cannot clarify that based on the current context.";

/// The three generation stages, as seen by the compose flow and the
/// delegate controllers.
///
/// Implementations are expected to be infallible from the caller's point of
/// view: transport failures, timeouts and malformed backend output all
/// resolve to the documented fallbacks. Output is not deterministic - the
/// same input may legitimately produce different results on retry.
#[async_trait]
pub trait ContextGenerator: Send + Sync {
    /// Produces clarifying questions for a raw draft.
    ///
    /// Targets exactly three questions probing intent, unspoken assumptions
    /// and emotional tone. A blank draft or any backend failure yields
    /// [`FALLBACK_QUESTIONS`].
    async fn interview_questions(&self, draft: &str) -> Vec<String>;

    /// Synthesizes a context profile from the draft and the interview
    /// transcript.
    ///
    /// The draft is ground truth; the transcript disambiguates it. On
    /// failure returns [`ContextProfile::fallback`].
    async fn context_profile(
        &self,
        draft: &str,
        interview_history: &[ConversationMessage],
    ) -> ContextProfile;

    /// Answers a reader query on the author's behalf, strictly within the
    /// bounds of the post and its profile.
    ///
    /// Only the last [`DELEGATE_HISTORY_WINDOW`] entries of `chat_history`
    /// reach the backend. On failure returns one of the fixed apology
    /// strings, never a raw error.
    async fn delegate_response(
        &self,
        original_post: &str,
        profile: &ContextProfile,
        user_query: &str,
        chat_history: &[ConversationMessage],
    ) -> String;
}
