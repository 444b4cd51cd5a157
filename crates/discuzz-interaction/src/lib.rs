//! Discuzz Interaction - generation backends for the context protocol.
//!
//! This crate connects the domain layer in `discuzz-core` to concrete
//! LLM backends. The pieces are:
//!
//! - [`gateway`]: the normalized request/outcome contract every backend
//!   implements, with a typed error taxonomy.
//! - [`gemini`], [`openai`], [`relay`]: the three gateway implementations
//!   (direct Gemini REST, OpenAI-compatible chat completions, and the
//!   product's own hosted relay endpoints).
//! - [`pipeline`]: the [`ContextPipeline`] that adapts any gateway to the
//!   core [`ContextGenerator`](discuzz_core::ContextGenerator) trait,
//!   applying timeouts and fallback substitution so callers never see
//!   backend failures.
//! - [`prompts`] and [`schema`]: the stage prompt texts and the tolerant
//!   parsing of structured model output, shared across gateways.

pub mod config;
pub mod gateway;
pub mod gemini;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod relay;
pub mod schema;

pub use gateway::{GatewayError, GenerationGateway, GenerationOutcome, GenerationRequest};
pub use gemini::GeminiGateway;
pub use openai::OpenAiGateway;
pub use pipeline::ContextPipeline;
pub use relay::RelayGateway;
