//! Locates the API key for the hosted backend.

use crate::error::OpenAiError;
use std::path::Path;

/// Environment variable consulted when no token file is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolves the API key.
///
/// Resolution order:
/// 1. First non-empty line of `token_path`, if provided.
/// 2. The `OPENAI_API_KEY` environment variable.
/// 3. `OpenAiError::MissingApiKey`.
///
/// An explicit token file that cannot be read is an error; it does not fall
/// through to the environment.
pub fn resolve_api_key(token_path: Option<&Path>) -> Result<String, OpenAiError> {
    if let Some(path) = token_path {
        let content = std::fs::read_to_string(path).map_err(|source| OpenAiError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        return content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_owned)
            .ok_or(OpenAiError::MissingApiKey);
    }

    match std::env::var(OPENAI_API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_owned()),
        _ => Err(OpenAiError::MissingApiKey),
    }
}
