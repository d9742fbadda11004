//! The model capability consumed by the orchestrator.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a model backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from the hosted chat-completions adapter.
    #[error("Hosted API error: {0}")]
    OpenAi(#[from] openai_adapter::OpenAiError),

    /// Error from the Ollama adapter.
    #[error("Ollama error: {0}")]
    Ollama(#[from] ollama_adapter::OllamaError),

    /// The call did not return within its time limit.
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend does not support the requested operation.
    #[error("Unsupported backend operation: {0}")]
    Unsupported(String),
}

/// A language model with an explicit conversational context.
///
/// Lifecycle: [`init_context`](Self::init_context) once (plus an optional
/// [`init_image_context`](Self::init_image_context)), then any number of
/// [`ask`](Self::ask) turns, [`reset_context`](Self::reset_context) between
/// independent queries, and finally
/// [`release_resources`](Self::release_resources).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier used in logs and the run log.
    fn name(&self) -> &str;

    /// Whether [`init_image_context`](Self::init_image_context) is supported.
    fn supports_images(&self) -> bool {
        false
    }

    /// Installs the system primer, discarding any previous context.
    async fn init_context(&mut self, primer: &str) -> Result<(), BackendError>;

    /// Primes the context with an image of the operating area.
    async fn init_image_context(&mut self, image: &Path) -> Result<(), BackendError> {
        Err(BackendError::Unsupported(format!(
            "{} does not accept image context ({})",
            self.name(),
            image.display()
        )))
    }

    /// Sends `prompt` and returns the raw reply.
    ///
    /// With `use_context` the reply continues (and extends) the conversation;
    /// without it only the primer precedes the prompt and nothing is recorded.
    async fn ask(&mut self, prompt: &str, use_context: bool) -> Result<String, BackendError>;

    /// Drops conversational turns, keeping the primer.
    fn reset_context(&mut self);

    /// Checks that the backend is reachable and ready.
    async fn check_health(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Releases backend-side resources (e.g. unloads a local model).
    async fn release_resources(&mut self) -> Result<(), BackendError>;
}
