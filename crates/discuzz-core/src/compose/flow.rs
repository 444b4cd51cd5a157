//! The compose-flow state machine.
//!
//! Sequences an author through Draft -> Interview -> Summary -> Review,
//! owning the in-progress question queue and answer transcript. The two
//! generator calls (interview start, synthesis) are the only suspension
//! points; all state mutation happens after they return, so a future
//! dropped mid-call leaves the flow exactly as it was.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{DiscuzzError, Result};
use crate::generator::ContextGenerator;
use crate::message::{ConversationMessage, MessageRole};
use crate::post::{Author, Post};
use crate::profile::ContextProfile;

use super::replay::{interview_messages, interview_transcript, INTERVIEW_INTRO};

/// The four steps of the compose wizard, linear forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeStep {
    #[default]
    Draft,
    Interview,
    Summary,
    Review,
}

impl ComposeStep {
    fn name(&self) -> &'static str {
        match self {
            ComposeStep::Draft => "Draft",
            ComposeStep::Interview => "Interview",
            ComposeStep::Summary => "Summary",
            ComposeStep::Review => "Review",
        }
    }
}

/// Client-side controller for the compose wizard.
///
/// Invariant: `questions.len() == answers.len()` at every step past the
/// start of the interview; an empty string marks an unanswered index.
#[derive(Debug, Default)]
pub struct ComposeFlow {
    step: ComposeStep,
    draft: String,
    image_url: Option<String>,
    questions: Vec<String>,
    answers: Vec<String>,
    current_index: usize,
    messages: Vec<ConversationMessage>,
    profile: Option<ContextProfile>,
}

impl ComposeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> ComposeStep {
        self.step
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The visible interview message history.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// The synthesized profile, present only in Review.
    pub fn profile(&self) -> Option<&ContextProfile> {
        self.profile.as_ref()
    }

    /// Wizard completion percentage, for the progress bar.
    pub fn progress(&self) -> u8 {
        match self.step() {
            ComposeStep::Draft => 10,
            ComposeStep::Interview => {
                let total = self.questions.len().max(1);
                20 + ((self.current_index * 50) / total) as u8
            }
            ComposeStep::Summary => 80,
            ComposeStep::Review => 100,
        }
    }

    /// Updates the draft text. Only allowed before the interview starts;
    /// editing the draft afterwards requires restarting from Draft.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<()> {
        if self.step() != ComposeStep::Draft {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "edit the draft",
            ));
        }
        self.draft = text.into();
        Ok(())
    }

    /// Starts the interview: asks the generator for clarifying questions and
    /// seeds the message history with the first one.
    ///
    /// A generator returning zero questions leaves the flow in Draft.
    pub async fn start_interview(&mut self, generator: &dyn ContextGenerator) -> Result<()> {
        if self.step() != ComposeStep::Draft {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "start the interview",
            ));
        }
        if self.draft.trim().is_empty() {
            return Err(DiscuzzError::invalid_input("draft is empty"));
        }

        let questions = generator.interview_questions(&self.draft).await;
        if questions.is_empty() {
            return Ok(());
        }

        self.answers = vec![String::new(); questions.len()];
        self.current_index = 0;
        self.messages = vec![ConversationMessage::new(
            "intro",
            MessageRole::Model,
            format!("{INTERVIEW_INTRO}\n\n{}", questions[0]),
        )];
        self.questions = questions;
        self.step = ComposeStep::Interview;
        Ok(())
    }

    /// Records the answer for the current question and advances, moving to
    /// Summary after the last one. Blank answers are rejected before any
    /// state changes.
    pub fn submit_answer(&mut self, answer: &str) -> Result<()> {
        if self.step() != ComposeStep::Interview {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "submit an answer",
            ));
        }
        if answer.trim().is_empty() {
            return Err(DiscuzzError::invalid_input("answer is empty"));
        }

        let index = self.current_index;
        self.answers[index] = answer.to_string();
        self.messages.push(ConversationMessage::new(
            format!("ans-{index}"),
            MessageRole::User,
            answer,
        ));

        let next = index + 1;
        if let Some(question) = self.questions.get(next) {
            self.messages.push(ConversationMessage::new(
                format!("q-{next}"),
                MessageRole::Model,
                question.clone(),
            ));
            self.current_index = next;
        } else {
            self.step = ComposeStep::Summary;
        }
        Ok(())
    }

    /// Jumps back into the interview at `index`, rebuilding the message
    /// history from the transcript. Returns the existing answer at that
    /// index so the caller can pre-fill its input field.
    pub fn edit_at(&mut self, index: usize) -> Result<String> {
        if !matches!(
            self.step(),
            ComposeStep::Interview | ComposeStep::Summary | ComposeStep::Review
        ) {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "edit an answer",
            ));
        }
        if index >= self.questions.len() {
            return Err(DiscuzzError::invalid_input(format!(
                "no interview question at index {index}"
            )));
        }

        self.current_index = index;
        self.messages = interview_messages(&self.questions, &self.answers, index);
        self.profile = None;
        self.step = ComposeStep::Interview;
        Ok(self.answers[index].clone())
    }

    /// One step backward.
    ///
    /// From the first interview question this is a full restart: the
    /// question queue, transcript and message history are all cleared.
    pub fn back(&mut self) -> Result<()> {
        match self.step() {
            ComposeStep::Draft => Err(DiscuzzError::invalid_transition("Draft", "go back")),
            ComposeStep::Interview => {
                if self.current_index > 0 {
                    self.edit_at(self.current_index - 1)?;
                } else {
                    self.step = ComposeStep::Draft;
                    self.messages.clear();
                    self.questions.clear();
                    self.answers.clear();
                    self.current_index = 0;
                }
                Ok(())
            }
            ComposeStep::Summary => {
                self.edit_at(self.questions.len().saturating_sub(1))?;
                Ok(())
            }
            ComposeStep::Review => {
                self.profile = None;
                self.step = ComposeStep::Summary;
                Ok(())
            }
        }
    }

    /// Synthesizes the context profile from the draft and the current
    /// transcript, then moves to Review.
    ///
    /// Always uses the transcript as it stands at this moment, so an edit
    /// followed by re-synthesis is expected to change the result.
    pub async fn synthesize(&mut self, generator: &dyn ContextGenerator) -> Result<()> {
        if self.step() != ComposeStep::Summary {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "synthesize the profile",
            ));
        }

        let transcript = interview_transcript(&self.questions, &self.answers);
        let profile = generator.context_profile(&self.draft, &transcript).await;
        self.profile = Some(profile);
        self.step = ComposeStep::Review;
        Ok(())
    }

    /// Publishes: freezes the draft as post content with the synthesized
    /// profile attached, resets the flow, and returns the finished post.
    pub fn publish(&mut self, author: &Author) -> Result<Post> {
        if self.step() != ComposeStep::Review {
            return Err(DiscuzzError::invalid_transition(
                self.step().name(),
                "publish",
            ));
        }
        let profile = self
            .profile
            .clone()
            .ok_or_else(|| DiscuzzError::internal("Review step without a profile"))?;

        let post = Post {
            id: Uuid::new_v4().to_string(),
            author_name: author.name.clone(),
            author_handle: author.handle.clone(),
            avatar_url: author.avatar_url.clone(),
            content: std::mem::take(&mut self.draft),
            image_url: self.image_url.take(),
            timestamp: Utc::now(),
            context_profile: profile,
            likes: 0,
            reply_count: 0,
            is_liked: false,
        };

        *self = Self::new();
        Ok(post)
    }

    /// Attaches an image to the pending post. Only meaningful before publish.
    pub fn attach_image(&mut self, url: impl Into<String>) {
        self.image_url = Some(url.into());
    }

    /// Removes a previously attached image.
    pub fn detach_image(&mut self) {
        self.image_url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FALLBACK_QUESTIONS;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator returning canned stage outputs, counting synthesis calls.
    struct CannedGenerator {
        questions: Vec<String>,
        profile: ContextProfile,
        synth_calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn new() -> Self {
            Self {
                questions: vec![
                    "Why post this now?".to_string(),
                    "Who should read it?".to_string(),
                    "What tone do you want?".to_string(),
                ],
                profile: ContextProfile {
                    intent: "To provoke debate.".to_string(),
                    tone: "Blunt".to_string(),
                    assumptions: "Offices foster culture.".to_string(),
                    audience: "Tech workers".to_string(),
                    core_argument: "Remote work erodes team culture.".to_string(),
                },
                synth_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
                profile: ContextProfile::fallback("Remote work kills culture"),
                synth_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContextGenerator for CannedGenerator {
        async fn interview_questions(&self, _draft: &str) -> Vec<String> {
            self.questions.clone()
        }

        async fn context_profile(
            &self,
            _draft: &str,
            _interview_history: &[ConversationMessage],
        ) -> ContextProfile {
            self.synth_calls.fetch_add(1, Ordering::SeqCst);
            self.profile.clone()
        }

        async fn delegate_response(
            &self,
            _original_post: &str,
            _profile: &ContextProfile,
            _user_query: &str,
            _chat_history: &[ConversationMessage],
        ) -> String {
            unreachable!("compose flow never calls the delegate")
        }
    }

    async fn flow_at_summary(generator: &CannedGenerator) -> ComposeFlow {
        let mut flow = ComposeFlow::new();
        flow.set_draft("Remote work kills culture").unwrap();
        flow.start_interview(generator).await.unwrap();
        flow.submit_answer("To provoke debate.").unwrap();
        flow.submit_answer("Tech workers.").unwrap();
        flow.submit_answer("Blunt.").unwrap();
        flow
    }

    #[tokio::test]
    async fn happy_path_publishes_draft_with_synthesized_profile() {
        let generator = CannedGenerator::new();
        let mut flow = flow_at_summary(&generator).await;
        assert_eq!(flow.step(), ComposeStep::Summary);

        flow.synthesize(&generator).await.unwrap();
        assert_eq!(flow.step(), ComposeStep::Review);
        assert_eq!(flow.profile(), Some(&generator.profile));

        let author = Author::new("Sam Rivera", "@samr");
        let post = flow.publish(&author).unwrap();
        assert_eq!(post.content, "Remote work kills culture");
        assert_eq!(post.context_profile, generator.profile);
        assert_eq!(post.likes, 0);
        assert_eq!(post.reply_count, 0);

        // flow is reset for the next compose session
        assert_eq!(flow.step(), ComposeStep::Draft);
        assert!(flow.draft().is_empty());
        assert!(flow.questions().is_empty());
    }

    #[tokio::test]
    async fn synthesis_outage_still_publishes_with_neutral_profile() {
        let generator = CannedGenerator::failing();
        let mut flow = flow_at_summary(&generator).await;
        flow.synthesize(&generator).await.unwrap();

        let profile = flow.profile().unwrap();
        assert_eq!(profile.tone, "Neutral");

        let post = flow.publish(&Author::new("Sam", "@sam")).unwrap();
        assert_eq!(post.context_profile.tone, "Neutral");
    }

    #[tokio::test]
    async fn empty_draft_is_rejected_before_any_call() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        flow.set_draft("   ").unwrap();
        let err = flow.start_interview(&generator).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(flow.step(), ComposeStep::Draft);
    }

    #[tokio::test]
    async fn interview_seeds_intro_and_parallel_answers() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        flow.set_draft("Remote work kills culture").unwrap();
        flow.start_interview(&generator).await.unwrap();

        assert_eq!(flow.step(), ComposeStep::Interview);
        assert_eq!(flow.questions().len(), flow.answers().len());
        assert_eq!(flow.messages().len(), 1);
        assert!(flow.messages()[0].content.contains("Why post this now?"));
        assert!(flow.messages()[0].content.starts_with(INTERVIEW_INTRO));
    }

    #[tokio::test]
    async fn blank_answer_is_rejected_without_state_change() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        flow.set_draft("draft").unwrap();
        flow.start_interview(&generator).await.unwrap();

        let err = flow.submit_answer("  \n ").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(flow.current_index(), 0);
        assert_eq!(flow.messages().len(), 1);
    }

    #[tokio::test]
    async fn back_from_first_question_clears_everything() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        flow.set_draft("draft").unwrap();
        flow.start_interview(&generator).await.unwrap();
        flow.submit_answer("first").unwrap();

        // index 1 -> back to 0 -> back to Draft, twice for idempotence
        flow.back().unwrap();
        assert_eq!(flow.current_index(), 0);
        flow.back().unwrap();
        assert_eq!(flow.step(), ComposeStep::Draft);
        assert!(flow.questions().is_empty());
        assert!(flow.answers().is_empty());
        assert!(flow.messages().is_empty());
        // draft itself survives the restart
        assert_eq!(flow.draft(), "draft");
    }

    #[tokio::test]
    async fn edit_at_replays_history_and_prefills_answer() {
        let generator = CannedGenerator::new();
        let mut flow = flow_at_summary(&generator).await;

        let prefill = flow.edit_at(1).unwrap();
        assert_eq!(prefill, "Tech workers.");
        assert_eq!(flow.step(), ComposeStep::Interview);
        assert_eq!(flow.current_index(), 1);

        let ids: Vec<&str> = flow.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["intro", "ans-0", "q-1"]);

        // replay again from the same transcript: identical history
        let replayed = interview_messages(flow.questions(), flow.answers(), 1);
        assert_eq!(flow.messages(), replayed.as_slice());
    }

    #[tokio::test]
    async fn edited_answer_feeds_next_synthesis() {
        let generator = CannedGenerator::new();
        let mut flow = flow_at_summary(&generator).await;

        flow.edit_at(2).unwrap();
        flow.submit_answer("Actually, conciliatory.").unwrap();
        assert_eq!(flow.step(), ComposeStep::Summary);
        assert_eq!(flow.answers()[2], "Actually, conciliatory.");

        flow.synthesize(&generator).await.unwrap();
        assert_eq!(generator.synth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn back_from_review_discards_profile() {
        let generator = CannedGenerator::new();
        let mut flow = flow_at_summary(&generator).await;
        flow.synthesize(&generator).await.unwrap();
        assert!(flow.profile().is_some());

        flow.back().unwrap();
        assert_eq!(flow.step(), ComposeStep::Summary);
        assert!(flow.profile().is_none());

        // forward again re-synthesizes
        flow.synthesize(&generator).await.unwrap();
        assert_eq!(generator.synth_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_step_operations_are_typed_errors() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        assert!(flow.submit_answer("hi").unwrap_err().is_invalid_transition());
        assert!(flow.back().unwrap_err().is_invalid_transition());
        assert!(flow
            .publish(&Author::new("a", "@a"))
            .unwrap_err()
            .is_invalid_transition());
        assert!(flow
            .synthesize(&generator)
            .await
            .unwrap_err()
            .is_invalid_transition());
    }

    #[tokio::test]
    async fn progress_advances_monotonically() {
        let generator = CannedGenerator::new();
        let mut flow = ComposeFlow::new();
        assert_eq!(flow.progress(), 10);
        flow.set_draft("draft").unwrap();
        flow.start_interview(&generator).await.unwrap();
        let mut last = flow.progress();
        assert_eq!(last, 20);
        for answer in ["a", "b", "c"] {
            flow.submit_answer(answer).unwrap();
            let now = flow.progress();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(flow.progress(), 80);
        flow.synthesize(&generator).await.unwrap();
        assert_eq!(flow.progress(), 100);
    }

    #[tokio::test]
    async fn attached_image_survives_to_publish() {
        let generator = CannedGenerator::new();
        let mut flow = flow_at_summary(&generator).await;
        flow.attach_image("https://img.example/p.png");
        flow.synthesize(&generator).await.unwrap();
        let post = flow.publish(&Author::new("Sam", "@sam")).unwrap();
        assert_eq!(post.image_url.as_deref(), Some("https://img.example/p.png"));
    }
}
