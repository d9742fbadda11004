//! # mission-planner
//!
//! Drives a language model to produce a schema-conformant mission plan,
//! feeding validator diagnostics back as the next prompt until the plan
//! validates or the retry budget runs out.
//!
//! - [`RetryOrchestrator`] - bounded retry loop with diagnostic feedback
//! - [`ResponseExtractor`] - pulls the fenced document out of model text
//! - [`ArtifactStore`] - persists every attempt under a fresh, unique path
//! - [`ModelClient`] / [`SchemaValidator`] - the two capability seams
//! - [`RunRecord`] - one run-log line per query, with its inverse parser
//!
//! ## Example
//!
//! ```no_run
//! # use mission_planner::prelude::*;
//! # use std::sync::Arc;
//! # async fn example(client: Box<dyn ModelClient>) -> Result<(), PlannerError> {
//! let validator = Arc::new(CommandValidator::xmllint("schemas/mission.xsd".into())?);
//! let store = ArtifactStore::open("outputs".into(), "xml")?;
//! let orchestrator = RetryOrchestrator::new(ResponseExtractor::new("xml"))
//!     .max_retries(5);
//! let sources = ContextSources::new("schemas/mission.xsd".into(), "layout.txt".into());
//!
//! let mut session = Session::open(client, &sources, "xml", validator, store, orchestrator).await?;
//! let outcome = session.run("Inspect rows 1 to 4 and return to base").await?;
//! println!("succeeded: {}", outcome.succeeded());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod backends;
pub mod config;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod inputs;
pub mod model;
pub mod orchestrator;
pub mod primer;
pub mod record;
pub mod runlog;
pub mod session;
pub mod settings;
pub mod summary;
pub mod sweep;
pub mod validation;

pub use artifacts::ArtifactStore;
pub use config::{FeedbackMode, OrchestratorConfig};
pub use error::PlannerError;
pub use extract::ResponseExtractor;
pub use model::{BackendError, ModelClient};
pub use orchestrator::RetryOrchestrator;
pub use record::{Attempt, QueryOutcome, Verdict};
pub use runlog::{RetryEntry, RunLog, RunRecord};
pub use session::Session;
pub use validation::{SchemaValidator, Validation};

/// Common imports for driving a planning session.
pub mod prelude {
    pub use crate::artifacts::ArtifactStore;
    pub use crate::backends::{select_backend, BackendKind, BackendSettings, ModelSpec};
    pub use crate::config::{FeedbackMode, OrchestratorConfig};
    pub use crate::error::PlannerError;
    pub use crate::extract::ResponseExtractor;
    pub use crate::model::{BackendError, ModelClient};
    pub use crate::orchestrator::RetryOrchestrator;
    pub use crate::primer::ContextSources;
    pub use crate::record::{QueryOutcome, Verdict};
    pub use crate::session::Session;
    pub use crate::validation::{CommandValidator, JsonSchemaValidator, SchemaValidator, Validation};
}
