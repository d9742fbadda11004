//! Error types for planning sessions.
//!
//! Only failures that are not a model-quality problem surface here. A
//! document that fails validation is a normal attempt outcome, and running
//! out of retries is a [`Verdict`](crate::record::Verdict), not an error.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::model::BackendError;
use crate::validation::ValidatorError;

/// Errors that abort a query, a session, or a sweep cell.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// An artifact could not be written. Fatal for the current query.
    #[error("Storage failure under {path}: {source}")]
    Storage {
        /// Directory or file involved.
        path: PathBuf,
        /// Underlying I/O error (`TimedOut` when the write exceeded its limit).
        #[source]
        source: std::io::Error,
    },

    /// The model backend errored, was unreachable, or timed out.
    #[error("Backend failure: {0}")]
    Backend(#[from] BackendError),

    /// The validator did not return within its time limit.
    #[error("Validator did not finish within {0:?}")]
    ValidatorTimeout(Duration),

    /// The validator could not be constructed.
    #[error("Validator setup failed: {0}")]
    Validator(#[from] ValidatorError),

    /// A required input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlannerError {
    /// Whether this error ends only the current query (the sweep moves on).
    #[must_use]
    pub const fn is_query_scoped(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Backend(_) | Self::ValidatorTimeout(_)
        )
    }
}
