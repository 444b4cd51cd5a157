//! Core domain model for Discuzz: posts with AI-generated context profiles.
//!
//! This crate holds the pipeline's data model (profiles, messages, posts),
//! the shared error type, the generator seam the controllers talk through,
//! and the compose-flow state machine. Networking lives in
//! `discuzz-interaction`; this crate is pure domain logic.

pub mod compose;
pub mod error;
pub mod generator;
pub mod message;
pub mod post;
pub mod profile;

pub use compose::{ComposeFlow, ComposeStep};
pub use error::DiscuzzError;
pub use generator::{
    ContextGenerator, DELEGATE_HISTORY_WINDOW, DELEGATE_NO_CONTEXT_REPLY,
    DELEGATE_UNAVAILABLE_REPLY, FALLBACK_QUESTIONS,
};
pub use message::{ConversationMessage, MessageRole};
pub use post::{Author, Comment, Post};
pub use profile::ContextProfile;
