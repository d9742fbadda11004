//! Attempt history and verdicts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::validation::Validation;

/// One generate-extract-persist-validate cycle.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// 0 for the initial attempt, 1.. for retries.
    pub ordinal: usize,
    /// Wall-clock time of the generation call alone.
    pub elapsed: Duration,
    /// Model output before extraction.
    pub raw_output: String,
    /// Extracted document, as written to `artifact`.
    pub document: String,
    /// Where the document was persisted.
    pub artifact: PathBuf,
    /// Validator outcome for `artifact`.
    pub validation: Validation,
}

impl Attempt {
    /// Whether this attempt is a retry.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.ordinal > 0
    }

    /// Whether the document validated.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}

/// Terminal state of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A document validated.
    Success {
        /// Artifact of the accepted attempt.
        artifact: PathBuf,
    },
    /// The retry budget ran out first.
    Exhausted {
        /// Every artifact produced, in attempt order.
        artifacts: Vec<PathBuf>,
    },
}

impl Verdict {
    /// Whether the query produced a valid document.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Full record of one query: the initial attempt, its retries, and the verdict.
///
/// Holding the initial attempt separately keeps exactly one ordinal-0 attempt
/// by construction.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Attempt 0.
    pub initial: Attempt,
    /// Retries in order, ordinals 1..=n.
    pub retries: Vec<Attempt>,
    /// Final verdict.
    pub verdict: Verdict,
}

impl QueryOutcome {
    /// Builds the outcome, deriving the verdict from the last attempt.
    #[must_use]
    pub fn new(initial: Attempt, retries: Vec<Attempt>) -> Self {
        let last = retries.last().unwrap_or(&initial);
        let verdict = if last.is_valid() {
            Verdict::Success {
                artifact: last.artifact.clone(),
            }
        } else {
            Verdict::Exhausted {
                artifacts: std::iter::once(&initial)
                    .chain(&retries)
                    .map(|a| a.artifact.clone())
                    .collect(),
            }
        };
        Self {
            initial,
            retries,
            verdict,
        }
    }

    /// Generation time of attempt 0.
    #[must_use]
    pub const fn initial_latency(&self) -> Duration {
        self.initial.elapsed
    }

    /// Artifact of attempt 0.
    #[must_use]
    pub fn initial_artifact(&self) -> &Path {
        &self.initial.artifact
    }

    /// Generation time of each retry, in order.
    #[must_use]
    pub fn retry_latencies(&self) -> Vec<Duration> {
        self.retries.iter().map(|a| a.elapsed).collect()
    }

    /// Artifact of each retry, in order.
    #[must_use]
    pub fn retry_artifacts(&self) -> Vec<&Path> {
        self.retries.iter().map(|a| a.artifact.as_path()).collect()
    }

    /// Whether the verdict is success.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.verdict.is_success()
    }

    /// Number of retries performed.
    #[must_use]
    pub fn retry_count(&self) -> usize {
        self.retries.len()
    }

    /// Initial attempt plus retries.
    #[must_use]
    pub fn total_attempts(&self) -> usize {
        1 + self.retries.len()
    }

    /// All attempts in order.
    pub fn attempts(&self) -> impl Iterator<Item = &Attempt> {
        std::iter::once(&self.initial).chain(&self.retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(ordinal: usize, valid: bool) -> Attempt {
        Attempt {
            ordinal,
            elapsed: Duration::from_millis(100 * (ordinal as u64 + 1)),
            raw_output: String::new(),
            document: String::new(),
            artifact: PathBuf::from(format!("/out/attempt-{ordinal}.xml")),
            validation: if valid {
                Validation::valid("ok")
            } else {
                Validation::invalid("bad")
            },
        }
    }

    #[test]
    fn success_points_at_the_last_attempt() {
        let outcome = QueryOutcome::new(attempt(0, false), vec![attempt(1, true)]);
        assert_eq!(
            outcome.verdict,
            Verdict::Success {
                artifact: PathBuf::from("/out/attempt-1.xml")
            }
        );
        assert_eq!(outcome.total_attempts(), 2);
        assert_eq!(outcome.retry_latencies(), vec![Duration::from_millis(200)]);
    }

    #[test]
    fn exhausted_lists_every_artifact() {
        let outcome = QueryOutcome::new(attempt(0, false), vec![attempt(1, false)]);
        match &outcome.verdict {
            Verdict::Exhausted { artifacts } => assert_eq!(artifacts.len(), 2),
            Verdict::Success { .. } => unreachable!("expected exhaustion"),
        }
        assert!(!outcome.succeeded());
    }

    #[test]
    fn attempts_iterate_in_ordinal_order() {
        let outcome = QueryOutcome::new(
            attempt(0, false),
            vec![attempt(1, false), attempt(2, true)],
        );
        let ordinals: Vec<usize> = outcome.attempts().map(|a| a.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert!(outcome.attempts().skip(1).all(Attempt::is_retry));
    }
}
