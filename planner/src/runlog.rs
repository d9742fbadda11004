//! The run log: one line per completed query.
//!
//! Line grammar (fields separated by `", "`):
//!
//! ```text
//! input <index>, model <name>, multimodal <bool>, temp <float>, question_time <float>,
//!     answer <path>[, ret <float>, answer <path>]*, succ <bool>
//! ```
//!
//! Booleans are written `True` / `False` and floats always carry a decimal
//! point, which keeps the file readable by the existing analysis scripts.
//! Lines written before the `multimodal` field existed are still parsed
//! (as non-multimodal).
//!
//! Values are not escaped: a model name or path containing the field
//! separator cannot be read back. Configuration rejects such model names
//! and artifact directories.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::backends::ModelSpec;
use crate::error::PlannerError;
use crate::record::QueryOutcome;

/// One retry of a logged query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryEntry {
    /// Generation time in seconds.
    pub latency: f64,
    /// Artifact path.
    pub answer: PathBuf,
}

/// One run-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Position of the query in the inputs file.
    pub input: usize,
    /// Model name.
    pub model: String,
    /// Whether the model was primed with an image.
    pub multimodal: bool,
    /// Sampling temperature.
    pub temperature: f64,
    /// Generation time of the initial attempt, in seconds.
    pub question_time: f64,
    /// Artifact of the initial attempt.
    pub answer: PathBuf,
    /// Retries in order.
    pub retries: Vec<RetryEntry>,
    /// Whether the query ended in success.
    pub succeeded: bool,
}

impl RunRecord {
    /// Builds the record of a completed query.
    #[must_use]
    pub fn from_outcome(
        input: usize,
        spec: &ModelSpec,
        temperature: f64,
        outcome: &QueryOutcome,
    ) -> Self {
        Self {
            input,
            model: spec.name.clone(),
            multimodal: spec.multimodal,
            temperature,
            question_time: outcome.initial_latency().as_secs_f64(),
            answer: outcome.initial_artifact().to_path_buf(),
            retries: outcome
                .retries
                .iter()
                .map(|a| RetryEntry {
                    latency: a.elapsed.as_secs_f64(),
                    answer: a.artifact.clone(),
                })
                .collect(),
            succeeded: outcome.succeeded(),
        }
    }

    /// Sum of retry latencies in seconds.
    #[must_use]
    pub fn total_retry_time(&self) -> f64 {
        self.retries.iter().map(|r| r.latency).sum()
    }
}

fn fmt_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Separates the fields of a run-log line.
pub const FIELD_SEPARATOR: &str = ", ";

const fn fmt_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input {}, model {}, multimodal {}, temp {}, question_time {}, answer {}",
            self.input,
            self.model,
            fmt_bool(self.multimodal),
            fmt_float(self.temperature),
            fmt_float(self.question_time),
            self.answer.display()
        )?;
        for retry in &self.retries {
            write!(
                f,
                ", ret {}, answer {}",
                fmt_float(retry.latency),
                retry.answer.display()
            )?;
        }
        write!(f, ", succ {}", fmt_bool(self.succeeded))
    }
}

/// Why a run-log line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunLogParseError {
    /// The line ended before a required field.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A field appeared where another was expected.
    #[error("expected field '{expected}', found '{found}'")]
    UnexpectedField {
        /// Expected key.
        expected: &'static str,
        /// Offending token.
        found: String,
    },

    /// A numeric field did not parse.
    #[error("invalid number for '{field}': {value}")]
    InvalidNumber {
        /// Field key.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// A boolean field was neither `True` nor `False`.
    #[error("invalid boolean for '{field}': {value}")]
    InvalidBool {
        /// Field key.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Text followed the `succ` field.
    #[error("unexpected trailing text: {0}")]
    Trailing(String),
}

struct Fields<'a> {
    tokens: std::iter::Peekable<std::str::Split<'a, &'static str>>,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            tokens: line.trim_end().split(FIELD_SEPARATOR).peekable(),
        }
    }

    fn peek_key(&mut self) -> Option<&'a str> {
        let token: &'a str = self.tokens.peek().copied()?;
        Some(token.split_once(' ').map_or(token, |(key, _)| key))
    }

    fn take(&mut self, key: &'static str) -> Result<&'a str, RunLogParseError> {
        let token = self.tokens.next().ok_or(RunLogParseError::MissingField(key))?;
        match token.split_once(' ') {
            Some((found, value)) if found == key => Ok(value),
            _ => Err(RunLogParseError::UnexpectedField {
                expected: key,
                found: token.to_string(),
            }),
        }
    }

    fn take_f64(&mut self, key: &'static str) -> Result<f64, RunLogParseError> {
        let value = self.take(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| RunLogParseError::InvalidNumber {
                field: key,
                value: value.to_string(),
            })
    }

    fn take_bool(&mut self, key: &'static str) -> Result<bool, RunLogParseError> {
        let value = self.take(key)?;
        match value.trim() {
            v if v.eq_ignore_ascii_case("true") => Ok(true),
            v if v.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(RunLogParseError::InvalidBool {
                field: key,
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for RunRecord {
    type Err = RunLogParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = Fields::new(line);

        let input_text = fields.take("input")?;
        let input = input_text
            .trim()
            .parse()
            .map_err(|_| RunLogParseError::InvalidNumber {
                field: "input",
                value: input_text.to_string(),
            })?;
        let model = fields.take("model")?.to_string();
        let multimodal = if fields.peek_key() == Some("multimodal") {
            fields.take_bool("multimodal")?
        } else {
            false
        };
        let temperature = fields.take_f64("temp")?;
        let question_time = fields.take_f64("question_time")?;
        let answer = PathBuf::from(fields.take("answer")?);

        let mut retries = Vec::new();
        while fields.peek_key() == Some("ret") {
            let latency = fields.take_f64("ret")?;
            let answer = PathBuf::from(fields.take("answer")?);
            retries.push(RetryEntry { latency, answer });
        }

        let succeeded = fields.take_bool("succ")?;
        if let Some(rest) = fields.tokens.next() {
            return Err(RunLogParseError::Trailing(rest.to_string()));
        }

        Ok(Self {
            input,
            model,
            multimodal,
            temperature,
            question_time,
            answer,
            retries,
            succeeded,
        })
    }
}

/// Append-only run-log file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Targets `path`; nothing is created until the first append.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line for `record`.
    pub fn append(&self, record: &RunRecord) -> Result<(), PlannerError> {
        let storage = |source: std::io::Error| PlannerError::Storage {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(storage)?;
        writeln!(file, "{record}").map_err(storage)
    }

    /// Reads every parseable line; returns the records and the number of
    /// malformed lines skipped.
    pub fn read(path: &Path) -> Result<(Vec<RunRecord>, usize), PlannerError> {
        let text = std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parse_lines(&text))
    }
}

/// Parses run-log text, skipping blank lines and counting malformed ones.
#[must_use]
pub fn parse_lines(text: &str) -> (Vec<RunRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<RunRecord>() {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(line = number + 1, error = %e, "skipping malformed run-log line");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}
