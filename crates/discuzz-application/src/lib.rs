//! Discuzz Application - delegate-facing services.
//!
//! Controllers sitting between the UI and the generation pipeline:
//!
//! - [`DelegateChatSession`]: a reader's private chat with a post's
//!   delegate.
//! - [`AutoReplyService`]: public delegate replies in a post's comment
//!   thread.
//!
//! Both depend only on the [`ContextGenerator`](discuzz_core::ContextGenerator)
//! trait; any pipeline or test double plugs in.

pub mod auto_reply;
pub mod chat;

#[cfg(test)]
pub(crate) mod testing;

pub use auto_reply::AutoReplyService;
pub use chat::DelegateChatSession;
