//! Deterministic reconstruction of interview message history.
//!
//! Backward navigation in the compose flow never patches the visible
//! message list incrementally; it rebuilds it from the question list and
//! answer transcript. Keeping these as pure functions guarantees that
//! replaying a jump to the same index always yields the same sequence.

use crate::message::{ConversationMessage, MessageRole};

/// Opening line of the interview, shown before the first question.
pub const INTERVIEW_INTRO: &str =
    "I've read your draft. Let's clarify a few things to build your context profile.";

/// Rebuilds the visible message history for the interview positioned at
/// `upto` (the question currently being answered or edited).
///
/// The result is the intro message carrying the first question, followed by
/// each already-given answer and the question that came after it. Message
/// ids are positional (`intro`, `ans-{i}`, `q-{i}`) and timestamps are the
/// epoch, so two rebuilds of the same transcript compare equal.
pub fn interview_messages(
    questions: &[String],
    answers: &[String],
    upto: usize,
) -> Vec<ConversationMessage> {
    let mut messages = Vec::new();
    let Some(first) = questions.first() else {
        return messages;
    };

    messages.push(ConversationMessage::replayed(
        "intro",
        MessageRole::Model,
        format!("{INTERVIEW_INTRO}\n\n{first}"),
    ));

    for i in 0..upto.min(questions.len()) {
        let Some(next) = questions.get(i + 1) else {
            break;
        };
        let answer = answers.get(i).cloned().unwrap_or_default();
        messages.push(ConversationMessage::replayed(
            format!("ans-{i}"),
            MessageRole::User,
            answer,
        ));
        messages.push(ConversationMessage::replayed(
            format!("q-{}", i + 1),
            MessageRole::Model,
            next.clone(),
        ));
    }

    messages
}

/// Builds the clean alternating transcript handed to the synthesizer:
/// one model message per question, one user message per answer.
pub fn interview_transcript(
    questions: &[String],
    answers: &[String],
) -> Vec<ConversationMessage> {
    questions
        .iter()
        .enumerate()
        .flat_map(|(i, question)| {
            let answer = answers.get(i).cloned().unwrap_or_default();
            [
                ConversationMessage::replayed(
                    format!("q-{i}"),
                    MessageRole::Model,
                    question.clone(),
                ),
                ConversationMessage::replayed(format!("a-{i}"), MessageRole::User, answer),
            ]
        })
        .collect()
}
