//! Validation by an external program, `xmllint` by default.
//!
//! The program receives its argument list with `{schema}` and `{document}`
//! replaced by the schema and artifact paths. Exit status zero means valid;
//! anything else is a diagnostic built from the program's stderr (or stdout
//! when stderr is empty).
//!
//! ## Default invocation
//! `xmllint --noout --schema {schema} {document}`: XSD validation without
//! echoing the document back.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{SchemaValidator, Validation, ValidatorError};

/// Placeholder replaced by the schema path.
pub const SCHEMA_PLACEHOLDER: &str = "{schema}";
/// Placeholder replaced by the document path.
pub const DOCUMENT_PLACEHOLDER: &str = "{document}";
/// Argument template used by [`CommandValidator::xmllint`].
pub const DEFAULT_XMLLINT_ARGS: [&str; 4] = ["--noout", "--schema", "{schema}", "{document}"];

/// Runs an external validator per document.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: PathBuf,
    args: Vec<String>,
    schema: PathBuf,
}

impl CommandValidator {
    /// Resolves `program` (an existing path, or a name looked up on `PATH`).
    pub fn new(program: &str, args: Vec<String>, schema: PathBuf) -> Result<Self, ValidatorError> {
        let program = resolve_program(program)?;
        if !schema.exists() {
            return Err(ValidatorError::SchemaRead {
                path: schema.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "schema file missing"),
            });
        }
        Ok(Self {
            program,
            args,
            schema,
        })
    }

    /// `xmllint` XSD validation with [`DEFAULT_XMLLINT_ARGS`].
    pub fn xmllint(schema: PathBuf) -> Result<Self, ValidatorError> {
        Self::new(
            "xmllint",
            DEFAULT_XMLLINT_ARGS.iter().map(|s| (*s).to_string()).collect(),
            schema,
        )
    }

    /// Resolved program path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Expands the argument template for `document`.
    #[must_use]
    pub fn build_args(&self, document: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                SCHEMA_PLACEHOLDER => self.schema.clone().into_os_string(),
                DOCUMENT_PLACEHOLDER => document.to_path_buf().into_os_string(),
                other => OsString::from(
                    other
                        .replace(SCHEMA_PLACEHOLDER, &self.schema.to_string_lossy())
                        .replace(DOCUMENT_PLACEHOLDER, &document.to_string_lossy()),
                ),
            })
            .collect()
    }
}

/// Explicit existing path first, then `PATH`.
fn resolve_program(program: &str) -> Result<PathBuf, ValidatorError> {
    let candidate = PathBuf::from(program);
    if candidate.components().count() > 1 && candidate.exists() {
        return Ok(candidate);
    }
    which::which(program).map_err(|source| ValidatorError::ProgramNotFound {
        program: program.to_string(),
        source,
    })
}

#[async_trait]
impl SchemaValidator for CommandValidator {
    async fn validate(&self, document: &Path) -> Validation {
        let output = Command::new(&self.program)
            .args(self.build_args(document))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => return Validation::invalid(format!("An error occurred: {e}")),
        };

        if output.status.success() {
            return Validation::valid("Document is valid.");
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        let detail = if detail.is_empty() {
            format!("validator exited with status {}", output.status)
        } else {
            detail.to_string()
        };
        Validation::invalid(format!("Document is invalid: {detail}"))
    }

    fn describe(&self) -> String {
        format!(
            "{} against {}",
            self.program.display(),
            self.schema.display()
        )
    }
}
