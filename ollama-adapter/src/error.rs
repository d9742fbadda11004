use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP request to Ollama failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model {model} is not available on {host}. Pull it with: ollama pull {model}")]
    ModelNotFound { model: String, host: String },

    #[error("Failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ollama reply did not contain a message")]
    EmptyResponse,
}
