//! Schema validation of persisted documents.
//!
//! Validators never fail a query: anything that goes wrong while checking a
//! document (unreadable file, malformed syntax, validator crash) comes back as
//! [`Validation::Invalid`] with a diagnostic the model can act on.

mod command;
mod json_schema;

pub use command::{CommandValidator, DEFAULT_XMLLINT_ARGS, DOCUMENT_PLACEHOLDER, SCHEMA_PLACEHOLDER};
pub use json_schema::JsonSchemaValidator;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The document conforms to the schema.
    Valid {
        /// Confirmation text.
        message: String,
    },
    /// The document does not conform, or could not be checked.
    Invalid {
        /// Human-readable explanation, sent back to the model on retry.
        diagnostic: String,
    },
}

impl Validation {
    /// Builds a `Valid` outcome.
    #[must_use]
    pub fn valid(message: impl Into<String>) -> Self {
        Self::Valid {
            message: message.into(),
        }
    }

    /// Builds an `Invalid` outcome.
    #[must_use]
    pub fn invalid(diagnostic: impl Into<String>) -> Self {
        Self::Invalid {
            diagnostic: diagnostic.into(),
        }
    }

    /// Whether the document passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The confirmation or diagnostic text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Valid { message } => message,
            Self::Invalid { diagnostic } => diagnostic,
        }
    }

    /// The diagnostic, if the document failed.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { diagnostic } => Some(diagnostic),
        }
    }
}

/// Errors raised while constructing a validator.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The schema file could not be read.
    #[error("Failed to read schema {path}: {source}")]
    SchemaRead {
        /// Schema path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schema is not usable.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The validator program could not be located.
    #[error("Validator program {program} not found: {source}")]
    ProgramNotFound {
        /// Program name or path as configured.
        program: String,
        /// Lookup error.
        #[source]
        source: which::Error,
    },
}

/// Checks a document on disk against a schema.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    /// Validates the document at `document`.
    async fn validate(&self, document: &Path) -> Validation;

    /// Short description for diagnostics and health checks.
    fn describe(&self) -> String;
}
