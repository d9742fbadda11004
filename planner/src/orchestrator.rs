//! Orchestration of the retry-until-valid loop for a single query.

use tokio::time::{timeout, Instant};

use crate::artifacts::ArtifactStore;
use crate::config::OrchestratorConfig;
use crate::error::PlannerError;
use crate::extract::ResponseExtractor;
use crate::feedback::{build_retry_prompt, Diagnostic};
use crate::model::{BackendError, ModelClient};
use crate::record::{Attempt, QueryOutcome};
use crate::validation::{SchemaValidator, Validation};

/// Orchestrator for running bounded retry loops with validation feedback.
///
/// Each attempt asks the model, extracts the fenced document, persists it,
/// and validates the artifact. An invalid document sends the validator's
/// diagnostic back as the next prompt until a document validates or
/// `max_retries` retries have been spent.
#[derive(Debug, Clone)]
pub struct RetryOrchestrator {
    config: OrchestratorConfig,
    extractor: ResponseExtractor,
}

impl RetryOrchestrator {
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(extractor: ResponseExtractor) -> Self {
        Self {
            config: OrchestratorConfig::default(),
            extractor,
        }
    }

    /// Creates an orchestrator with the given configuration.
    #[must_use]
    pub const fn with_config(config: OrchestratorConfig, extractor: ResponseExtractor) -> Self {
        Self { config, extractor }
    }

    /// Sets the retry budget (fluent builder pattern).
    #[must_use]
    pub const fn max_retries(mut self, max: usize) -> Self {
        self.config.max_retries = max;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Runs one query to a verdict.
    ///
    /// The client's context is reset exactly once before returning, whether
    /// the query succeeded, exhausted its budget, or aborted.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Backend` if the model call fails or times out,
    /// `PlannerError::Storage` if an artifact cannot be written, and
    /// `PlannerError::ValidatorTimeout` if validation does not finish in time.
    /// Running out of retries is not an error.
    pub async fn run(
        &self,
        client: &mut dyn ModelClient,
        validator: &dyn SchemaValidator,
        store: &ArtifactStore,
        query: &str,
    ) -> Result<QueryOutcome, PlannerError> {
        let result = self.attempt_sequence(client, validator, store, query).await;
        client.reset_context();
        result
    }

    async fn attempt_sequence(
        &self,
        client: &mut dyn ModelClient,
        validator: &dyn SchemaValidator,
        store: &ArtifactStore,
        query: &str,
    ) -> Result<QueryOutcome, PlannerError> {
        let initial = self
            .attempt(client, validator, store, 0, query, true)
            .await?;

        let mut retries: Vec<Attempt> = Vec::new();
        let mut history: Vec<Diagnostic> = Vec::new();
        let continued = self.config.persist_context_across_retries;

        loop {
            let last = retries.last().unwrap_or(&initial);
            let Some(diagnostic) = last.validation.diagnostic() else {
                break;
            };
            if retries.len() >= self.config.max_retries {
                tracing::error!(
                    model = client.name(),
                    attempts = 1 + retries.len(),
                    "Unable to generate a valid mission plan within the retry budget"
                );
                break;
            }

            history.push(Diagnostic {
                attempt: last.ordinal,
                message: diagnostic.to_string(),
            });
            tracing::warn!(
                model = client.name(),
                retry = retries.len() + 1,
                max_retries = self.config.max_retries,
                diagnostic,
                "Retrying after failed validation"
            );

            let prompt = build_retry_prompt(query, &history, self.config.feedback, continued);
            let ordinal = retries.len() + 1;
            let attempt = self
                .attempt(client, validator, store, ordinal, &prompt, continued)
                .await?;
            retries.push(attempt);
        }

        let outcome = QueryOutcome::new(initial, retries);
        if outcome.succeeded() {
            tracing::debug!(
                model = client.name(),
                attempts = outcome.total_attempts(),
                "Successful mission plan generation"
            );
        }
        Ok(outcome)
    }

    async fn attempt(
        &self,
        client: &mut dyn ModelClient,
        validator: &dyn SchemaValidator,
        store: &ArtifactStore,
        ordinal: usize,
        prompt: &str,
        use_context: bool,
    ) -> Result<Attempt, PlannerError> {
        let start = Instant::now();
        let raw_output = timeout(self.config.ask_timeout, client.ask(prompt, use_context))
            .await
            .map_err(|_| BackendError::Timeout(self.config.ask_timeout))??;
        let elapsed = start.elapsed();
        tracing::debug!(
            ordinal,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            raw = %raw_output,
            "model replied"
        );

        let document = self.extractor.extract(&raw_output).to_owned();
        let artifact = store.persist(&document).await?;
        tracing::debug!(ordinal, artifact = %artifact.display(), "attempt written");

        let validation: Validation =
            timeout(self.config.validate_timeout, validator.validate(&artifact))
                .await
                .map_err(|_| PlannerError::ValidatorTimeout(self.config.validate_timeout))?;

        Ok(Attempt {
            ordinal,
            elapsed,
            raw_output,
            document,
            artifact,
            validation,
        })
    }
}
