//! The Context Profile artifact.

use serde::{Deserialize, Serialize};

/// Structured summary attached to every published post.
///
/// Created once by the context synthesizer and immutable afterwards; the
/// delegate answers reader queries strictly within its bounds. All five
/// fields are mandatory - a generator response missing any of them is a
/// contract violation, not a valid profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextProfile {
    /// The primary goal of the post.
    pub intent: String,
    /// The emotional nuance.
    pub tone: String,
    /// Underlying premises.
    pub assumptions: String,
    /// Target demographic.
    pub audience: String,
    /// The central thesis in one sentence.
    pub core_argument: String,
}

impl ContextProfile {
    /// The canned neutral profile substituted when synthesis fails.
    ///
    /// Structurally valid but low-information, so the post can still
    /// publish instead of blocking the author.
    pub fn fallback(draft: &str) -> Self {
        Self {
            intent: "To share an opinion.".to_string(),
            tone: "Neutral".to_string(),
            assumptions: "None explicitly stated.".to_string(),
            audience: "General public".to_string(),
            core_argument: draft.to_string(),
        }
    }
}
