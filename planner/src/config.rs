//! Configuration for retry behavior.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which diagnostics a retry prompt carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// Only the most recent diagnostic.
    #[default]
    Latest,
    /// Every diagnostic of the query so far, labelled by attempt.
    Cumulative,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of retries after the initial attempt (default: 3).
    pub max_retries: usize,
    /// Diagnostic feedback strategy (default: latest only).
    pub feedback: FeedbackMode,
    /// Whether retries continue the conversation of the query (default: true).
    ///
    /// When false, each retry is a context-free turn that restates the query
    /// before the feedback.
    pub persist_context_across_retries: bool,
    /// Time limit for one model call (default: 300 seconds).
    pub ask_timeout: Duration,
    /// Time limit for one validation (default: 60 seconds).
    pub validate_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            feedback: FeedbackMode::Latest,
            persist_context_across_retries: true,
            ask_timeout: Duration::from_secs(300),
            validate_timeout: Duration::from_secs(60),
        }
    }
}

impl OrchestratorConfig {
    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the feedback strategy.
    #[must_use]
    pub const fn with_feedback(mut self, feedback: FeedbackMode) -> Self {
        self.feedback = feedback;
        self
    }

    /// Set whether retries continue the query's conversation.
    #[must_use]
    pub const fn with_context_persistence(mut self, persist: bool) -> Self {
        self.persist_context_across_retries = persist;
        self
    }

    /// Set the model call time limit.
    #[must_use]
    pub const fn with_ask_timeout(mut self, limit: Duration) -> Self {
        self.ask_timeout = limit;
        self
    }

    /// Set the validation time limit.
    #[must_use]
    pub const fn with_validate_timeout(mut self, limit: Duration) -> Self {
        self.validate_timeout = limit;
        self
    }
}
