//! Rust adapter for models served by a local Ollama daemon.
//!
//! Provides a thin client for `/api/chat`, model availability checks via
//! `/api/tags`, explicit unloading, and a [`Conversation`] state object that
//! can carry image attachments for multimodal models.

/// HTTP execution against the Ollama API.
pub mod client;
/// Conversation state: primer messages plus accumulated turns.
pub mod conversation;
/// Error types returned by adapter operations.
pub mod error;
/// Image loading for multimodal priming.
pub mod image;
/// Shared data types for configuration, messages, and wire payloads.
pub mod types;

pub use client::OllamaClient;
pub use conversation::Conversation;
pub use error::OllamaError;
pub use image::encode_image;
pub use types::*;
