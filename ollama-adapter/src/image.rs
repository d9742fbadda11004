use crate::error::OllamaError;
use base64::Engine;
use std::path::Path;

/// Reads an image file and returns its base64 encoding for `images` fields.
pub fn encode_image(path: &Path) -> Result<String, OllamaError> {
    let bytes = std::fs::read(path).map_err(|source| OllamaError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
