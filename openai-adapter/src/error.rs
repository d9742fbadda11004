use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("No API key found. Provide a token file or set OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Failed to read API key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("API returned no choices for model {model}")]
    EmptyResponse { model: String },
}
