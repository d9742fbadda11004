//! Rust adapter for hosted OpenAI-compatible chat-completions APIs.
//!
//! This crate provides API key resolution, a thin HTTP client for the
//! `/chat/completions` endpoint, and an explicit [`Conversation`] state object
//! that callers use to keep (or drop) multi-turn context between requests.

/// Conversation state: primer messages plus accumulated turns.
pub mod conversation;
/// Resolution of the API key from a token file or the environment.
pub mod credentials;
/// Error types returned by adapter operations.
pub mod error;
/// HTTP execution against the chat-completions endpoint.
pub mod client;
/// Shared data types for configuration, messages, and wire payloads.
pub mod types;

pub use client::OpenAiClient;
pub use conversation::Conversation;
pub use credentials::{resolve_api_key, OPENAI_API_KEY_ENV};
pub use error::OpenAiError;
pub use types::*;
