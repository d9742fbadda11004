//! Full experiment sweep: models × temperatures × inputs.
//!
//! Each (model, temperature) cell gets its own backend instance and
//! [`Session`]. Queries inside a cell run strictly one after another. A
//! failing query or cell is logged and skipped, including a query whose
//! run-log line cannot be written; only an unusable artifact directory
//! stops the sweep.

use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::backends::ModelSpec;
use crate::error::PlannerError;
use crate::extract::ResponseExtractor;
use crate::model::{BackendError, ModelClient};
use crate::orchestrator::RetryOrchestrator;
use crate::runlog::{RunLog, RunRecord};
use crate::session::Session;
use crate::settings::PlannerConfig;
use crate::validation::SchemaValidator;

/// Counts gathered over a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Cells whose session opened.
    pub cells: usize,
    /// Cells skipped because the backend could not be built or primed.
    pub failed_cells: usize,
    /// Queries that reached a verdict and were logged.
    pub completed: usize,
    /// Completed queries that ended in success.
    pub succeeded: usize,
    /// Queries aborted by a backend, storage, or validator-timeout failure,
    /// or whose run-log line could not be written.
    pub aborted: usize,
}

/// Runs every input through every (model, temperature) cell.
///
/// `make_client` builds the backend for a cell; production code passes a
/// closure over [`select_backend`](crate::backends::select_backend).
pub async fn run_sweep<F>(
    config: &PlannerConfig,
    inputs: &[String],
    validator: Arc<dyn SchemaValidator>,
    run_log: &RunLog,
    mut make_client: F,
) -> Result<SweepReport, PlannerError>
where
    F: FnMut(&ModelSpec, f64) -> Result<Box<dyn ModelClient>, BackendError>,
{
    let store = ArtifactStore::open(config.log_directory.clone(), &config.fence_tag)?
        .with_write_timeout(config.write_timeout());
    let orchestrator = RetryOrchestrator::with_config(
        config.orchestrator_config(),
        ResponseExtractor::new(&config.fence_tag),
    );
    let mut report = SweepReport::default();

    for spec in &config.models {
        for &temperature in &config.temperatures {
            tracing::info!(model = %spec.name, temperature, "Starting sweep cell");

            let client = match make_client(spec, temperature) {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!(model = %spec.name, temperature, error = %e, "Backend unavailable, skipping cell");
                    report.failed_cells += 1;
                    continue;
                }
            };

            let mut session = match Session::open(
                client,
                &config.context_sources(spec),
                &config.fence_tag,
                Arc::clone(&validator),
                store.clone(),
                orchestrator.clone(),
            )
            .await
            {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(model = %spec.name, temperature, error = %e, "Failed to prime backend, skipping cell");
                    report.failed_cells += 1;
                    continue;
                }
            };
            report.cells += 1;

            for (index, query) in inputs.iter().enumerate() {
                match session.run(query).await {
                    Ok(outcome) => {
                        let record = RunRecord::from_outcome(index, spec, temperature, &outcome);
                        if let Err(e) = run_log.append(&record) {
                            report.aborted += 1;
                            tracing::error!(
                                model = %spec.name,
                                temperature,
                                input = index,
                                error = %e,
                                "Failed to record query"
                            );
                            continue;
                        }
                        report.completed += 1;
                        if outcome.succeeded() {
                            report.succeeded += 1;
                        }
                        tracing::info!(
                            model = %spec.name,
                            temperature,
                            input = index,
                            retries = outcome.retry_count(),
                            succeeded = outcome.succeeded(),
                            "Query finished"
                        );
                    }
                    Err(e) => {
                        report.aborted += 1;
                        tracing::error!(
                            model = %spec.name,
                            temperature,
                            input = index,
                            error = %e,
                            "Query aborted"
                        );
                    }
                }
            }

            if let Err(e) = session.close().await {
                tracing::warn!(model = %spec.name, error = %e, "Failed to release backend resources");
            }
        }
    }

    tracing::info!(
        cells = report.cells,
        completed = report.completed,
        succeeded = report.succeeded,
        aborted = report.aborted,
        "Sweep finished"
    );
    Ok(report)
}
