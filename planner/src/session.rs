//! A primed backend bound to a validator, an artifact store, and a retry policy.

use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::error::PlannerError;
use crate::model::ModelClient;
use crate::orchestrator::RetryOrchestrator;
use crate::primer::ContextSources;
use crate::record::QueryOutcome;
use crate::validation::SchemaValidator;

/// One backend instance serving a sequence of independent queries.
///
/// The session exclusively owns the backend and its conversational context;
/// queries run one after another and the context is reset after each.
pub struct Session {
    client: Box<dyn ModelClient>,
    validator: Arc<dyn SchemaValidator>,
    store: ArtifactStore,
    orchestrator: RetryOrchestrator,
}

impl Session {
    /// Primes `client` from `sources` and binds it to the other collaborators.
    ///
    /// # Errors
    /// Returns `PlannerError::Read` if the schema or layout cannot be read,
    /// `PlannerError::Config` if an image is supplied to a text-only backend,
    /// and `PlannerError::Backend` if priming fails.
    pub async fn open(
        mut client: Box<dyn ModelClient>,
        sources: &ContextSources,
        fence_tag: &str,
        validator: Arc<dyn SchemaValidator>,
        store: ArtifactStore,
        orchestrator: RetryOrchestrator,
    ) -> Result<Self, PlannerError> {
        let primer = sources.load_primer(fence_tag)?;
        client.init_context(&primer).await?;

        if let Some(image) = &sources.image {
            if !client.supports_images() {
                return Err(PlannerError::Config(format!(
                    "model {} does not accept images but an image context was requested",
                    client.name()
                )));
            }
            client.init_image_context(image).await?;
        }

        tracing::debug!(
            model = client.name(),
            validator = %validator.describe(),
            artifacts = %store.dir().display(),
            "session opened"
        );

        Ok(Self {
            client,
            validator,
            store,
            orchestrator,
        })
    }

    /// Model identifier of the bound backend.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.client.name()
    }

    /// Runs one query to its verdict.
    pub async fn run(&mut self, query: &str) -> Result<QueryOutcome, PlannerError> {
        self.orchestrator
            .run(
                self.client.as_mut(),
                self.validator.as_ref(),
                &self.store,
                query,
            )
            .await
    }

    /// Releases backend resources and ends the session.
    pub async fn close(mut self) -> Result<(), PlannerError> {
        self.client.release_resources().await?;
        tracing::debug!(model = self.client.name(), "resources released");
        Ok(())
    }
}
