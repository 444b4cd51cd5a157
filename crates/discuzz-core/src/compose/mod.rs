//! Compose-flow domain module.
//!
//! - `flow`: the wizard state machine (`ComposeFlow`, `ComposeStep`)
//! - `replay`: pure reconstruction of interview message history

mod flow;
mod replay;

pub use flow::{ComposeFlow, ComposeStep};
pub use replay::{interview_messages, interview_transcript, INTERVIEW_INTRO};
