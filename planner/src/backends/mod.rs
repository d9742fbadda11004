//! Backend selection: maps a configured model onto a [`ModelClient`].

pub mod ollama;
pub mod openai;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::model::{BackendError, ModelClient};

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Which backend serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Hosted chat-completions API.
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama daemon.
    #[serde(rename = "ollama")]
    Ollama,
}

/// One model of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model identifier as the backend knows it.
    pub name: String,
    /// Serving backend.
    pub backend: BackendKind,
    /// Whether the model accepts image input.
    #[serde(default)]
    pub multimodal: bool,
}

/// Connection settings shared by every model of a sweep.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// API key file for the hosted backend.
    pub token: Option<PathBuf>,
    /// Hosted API base URL.
    pub openai_base_url: String,
    /// Ollama daemon address.
    pub ollama_host: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// HTTP-level timeout per request.
    pub http_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            token: None,
            openai_base_url: openai_adapter::DEFAULT_BASE_URL.to_string(),
            ollama_host: ollama_adapter::DEFAULT_HOST.to_string(),
            max_tokens: 2048,
            http_timeout: Duration::from_secs(300),
        }
    }
}

/// Builds the client for `spec` at `temperature`.
///
/// No request is made; call [`ModelClient::check_health`] to reach the backend.
pub fn select_backend(
    spec: &ModelSpec,
    temperature: f64,
    settings: &BackendSettings,
) -> Result<Box<dyn ModelClient>, BackendError> {
    match spec.backend {
        BackendKind::OpenAi => {
            tracing::debug!(model = %spec.name, "Using hosted API backend");
            let api_key = openai_adapter::resolve_api_key(settings.token.as_deref())?;
            let config = openai_adapter::OpenAiConfig {
                base_url: settings.openai_base_url.clone(),
                model: spec.name.clone(),
                api_key,
                temperature,
                max_tokens: settings.max_tokens,
                timeout: settings.http_timeout,
            };
            Ok(Box::new(OpenAiBackend::new(config)?))
        }
        BackendKind::Ollama => {
            tracing::debug!(model = %spec.name, "Using Ollama backend");
            let config = ollama_adapter::OllamaConfig {
                host: settings.ollama_host.clone(),
                model: spec.name.clone(),
                temperature,
                max_tokens: settings.max_tokens,
                timeout: settings.http_timeout,
            };
            Ok(Box::new(OllamaBackend::new(config, spec.multimodal)?))
        }
    }
}
