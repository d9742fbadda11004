//! In-process JSON Schema validation for plans emitted as JSON.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{SchemaValidator, Validation, ValidatorError};

/// Validates JSON documents against a JSON Schema.
pub struct JsonSchemaValidator {
    schema_path: PathBuf,
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Reads and compiles the schema at `schema_path`.
    pub fn from_path(schema_path: &Path) -> Result<Self, ValidatorError> {
        let text =
            std::fs::read_to_string(schema_path).map_err(|source| ValidatorError::SchemaRead {
                path: schema_path.to_path_buf(),
                source,
            })?;
        let schema: Value = serde_json::from_str(&text)
            .map_err(|e| ValidatorError::Schema(format!("schema is not valid JSON: {e}")))?;
        Self::from_value(schema_path.to_path_buf(), &schema)
    }

    /// Compiles an in-memory schema; `schema_path` is only used for display.
    pub fn from_value(schema_path: PathBuf, schema: &Value) -> Result<Self, ValidatorError> {
        let validator = jsonschema::Validator::new(schema)
            .map_err(|e| ValidatorError::Schema(e.to_string()))?;
        Ok(Self {
            schema_path,
            validator,
        })
    }

    /// Validates an already parsed instance, collecting every error.
    #[must_use]
    pub fn check(&self, instance: &Value) -> Validation {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|error| format!("At path '{}': {}", error.instance_path, error))
            .collect();

        if errors.is_empty() {
            Validation::valid("Document is valid.")
        } else {
            Validation::invalid(format!("Document is invalid: {}", errors.join("; ")))
        }
    }
}

#[async_trait]
impl SchemaValidator for JsonSchemaValidator {
    async fn validate(&self, document: &Path) -> Validation {
        let text = match tokio::fs::read_to_string(document).await {
            Ok(text) => text,
            Err(e) => return Validation::invalid(format!("An error occurred: {e}")),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(instance) => self.check(&instance),
            Err(e) => Validation::invalid(format!("Document is not valid JSON: {e}")),
        }
    }

    fn describe(&self) -> String {
        format!("JSON Schema {}", self.schema_path.display())
    }
}
