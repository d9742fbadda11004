//! Shared data types for the Ollama adapter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default address of a local Ollama daemon.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user turn.
    User,
    /// Model reply.
    Assistant,
}

/// A chat message, optionally carrying base64-encoded images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Base64 image payloads for multimodal models.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attaches a base64 image payload.
    #[must_use]
    pub fn with_image(mut self, base64: String) -> Self {
        self.images.push(base64);
        self
    }
}

/// Configuration for an Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Daemon address, e.g. `http://localhost:11434`.
    pub host: String,
    /// Model tag, e.g. `llava:7b`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens (`num_predict`).
    pub max_tokens: u32,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub options: ModelOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct ModelOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

/// Non-streaming reply of `/api/chat` (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// The assistant message.
    #[serde(default)]
    pub message: Option<ChatMessage>,
    /// Total generation time in nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Number of generated tokens.
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Reply of `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    /// Locally available models.
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One locally available model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    /// Model name including tag.
    pub name: String,
}
