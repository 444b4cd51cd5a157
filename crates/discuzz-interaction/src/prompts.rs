//! Instruction templates for the three generation stages.
//!
//! The wording here is part of the product contract: the interview must
//! probe exactly the intent/assumptions/tone triad, and the delegate must
//! stay inside the profile and pivot to the core argument rather than
//! invent new claims.

use discuzz_core::{ContextProfile, ConversationMessage, MessageRole};

/// Prompt for the interview stage.
pub fn interview_prompt(draft: &str) -> String {
    format!(
        r#"You are an insightful editor for Discuzz.ai. The user wants to post the following draft:
"{draft}"

Your goal is to extract the user's hidden context. Generate 3 short, sharp, leading questions that will help uncover:
1. Their underlying intent/goal.
2. The unspoken assumptions they are making.
3. The specific emotional tone or nuance they want to convey.

Return ONLY a JSON array of strings."#
    )
}

/// Prompt for the synthesis stage.
///
/// The draft is ground truth; the transcript is disambiguating evidence.
pub fn profile_prompt(draft: &str, interview_history: &[ConversationMessage]) -> String {
    let transcript = interview_history
        .iter()
        .map(|message| format!("{}: {}", message.role.label(), message.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze the following draft and interview transcript to create a structured Context Profile.

Draft: "{draft}"

Interview Transcript:
{transcript}

Extract the following fields accurately. The draft is the ground truth; the transcript only disambiguates it."#
    )
}

/// System instruction for the delegate stage.
pub fn delegate_system_instruction(original_post: &str, profile: &ContextProfile) -> String {
    format!(
        r#"You are the AI Delegate for the author of this post.

Original Post: "{original_post}"

Author's Context Profile (The "Truth"):
- Intent: {intent}
- Tone: {tone}
- Assumptions: {assumptions}
- Core Argument: {core_argument}

Your Task:
Respond to the Reader's query effectively.
1. STRICTLY adhere to the Author's tone and logic.
2. Do NOT invent new facts outside the context; if unsure, pivot back to the core argument.
3. Defend the author's viewpoint using the provided assumptions.
4. Keep it concise (under 280 characters if possible, max 500).
5. Do not start with "As the author..." just speak directly."#,
        intent = profile.intent,
        tone = profile.tone,
        assumptions = profile.assumptions,
        core_argument = profile.core_argument,
    )
}

/// Conversation block handed to the delegate alongside the system
/// instruction. The caller has already truncated `chat_history`.
pub fn delegate_user_prompt(user_query: &str, chat_history: &[ConversationMessage]) -> String {
    let history = chat_history
        .iter()
        .map(|message| {
            let speaker = match message.role {
                MessageRole::User => "Reader",
                _ => "Author Delegate",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous Chat:\n{history}\n\nReader: {user_query}")
}
