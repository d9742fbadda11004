//! YAML configuration of a planning sweep.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::backends::{BackendKind, BackendSettings, ModelSpec};
use crate::config::{FeedbackMode, OrchestratorConfig};
use crate::error::PlannerError;
use crate::primer::ContextSources;
use crate::runlog::FIELD_SEPARATOR;
use crate::validation::{
    CommandValidator, JsonSchemaValidator, SchemaValidator, DEFAULT_XMLLINT_ARGS,
};

/// Run-log file name used when `run_log` is not configured.
pub const DEFAULT_RUN_LOG: &str = "outputs.txt";

/// How generated documents are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorConfig {
    /// An external program; exit status 0 means valid.
    Command {
        /// Program name or path, resolved through `PATH`.
        #[serde(default = "default_program")]
        program: String,
        /// Arguments; `{schema}` and `{document}` are substituted.
        #[serde(default = "default_args")]
        args: Vec<String>,
    },
    /// In-process JSON Schema validation.
    JsonSchema,
}

fn default_program() -> String {
    "xmllint".to_string()
}

fn default_args() -> Vec<String> {
    DEFAULT_XMLLINT_ARGS.iter().map(ToString::to_string).collect()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::Command {
            program: default_program(),
            args: default_args(),
        }
    }
}

/// Retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Which diagnostics a retry prompt carries.
    pub feedback: FeedbackMode,
    /// Whether retries continue the query's conversation.
    pub persist_context_across_retries: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            feedback: FeedbackMode::Latest,
            persist_context_across_retries: true,
        }
    }
}

/// Time limits, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// One model call.
    pub ask_secs: u64,
    /// One validation.
    pub validate_secs: u64,
    /// One artifact write.
    pub write_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            ask_secs: 300,
            validate_secs: 60,
            write_secs: 30,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Default log level.
    #[serde(default = "default_logging")]
    pub logging: String,
    /// API key file for the hosted backend.
    #[serde(default)]
    pub token: Option<PathBuf>,
    /// Schema the documents must conform to.
    pub schema: PathBuf,
    /// Text description of the operating area.
    pub farm_layout: PathBuf,
    /// Image of the operating area, used by multimodal models.
    #[serde(default)]
    pub farm_image: Option<PathBuf>,
    /// Retry budget per query.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Artifact directory.
    pub log_directory: PathBuf,
    /// Run-log file; defaults to `outputs.txt` in `log_directory`.
    #[serde(default)]
    pub run_log: Option<PathBuf>,
    /// File of double-quoted requests.
    pub inputs: PathBuf,
    /// Ollama daemon address.
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    /// Hosted API base URL.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    /// Models to sweep.
    pub models: Vec<ModelSpec>,
    /// Temperatures to sweep.
    #[serde(default = "default_temperatures")]
    pub temperatures: Vec<f64>,
    /// Language tag of the fenced block holding the document.
    #[serde(default = "default_fence_tag")]
    pub fence_tag: String,
    /// Document validator.
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Retry behavior.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Time limits.
    #[serde(default)]
    pub timeouts: TimeoutSettings,
}

fn default_logging() -> String {
    "info".to_string()
}

const fn default_max_retries() -> usize {
    3
}

const fn default_max_tokens() -> u32 {
    2048
}

fn default_ollama_host() -> String {
    ollama_adapter::DEFAULT_HOST.to_string()
}

fn default_openai_base_url() -> String {
    openai_adapter::DEFAULT_BASE_URL.to_string()
}

fn default_temperatures() -> Vec<f64> {
    vec![0.0]
}

fn default_fence_tag() -> String {
    "xml".to_string()
}

impl PlannerConfig {
    /// Reads, parses and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, PlannerError> {
        let text = std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parses and validates YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, PlannerError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| PlannerError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.models.is_empty() {
            return Err(PlannerError::Config("no models configured".into()));
        }
        if self.temperatures.is_empty() {
            return Err(PlannerError::Config("no temperatures configured".into()));
        }
        if let Some(t) = self
            .temperatures
            .iter()
            .find(|t| !(0.0..=2.0).contains(*t))
        {
            return Err(PlannerError::Config(format!(
                "temperature {t} is outside [0, 2]"
            )));
        }
        let t = &self.timeouts;
        if t.ask_secs == 0 || t.validate_secs == 0 || t.write_secs == 0 {
            return Err(PlannerError::Config("timeouts must be non-zero".into()));
        }
        if self.fence_tag.trim().is_empty() {
            return Err(PlannerError::Config("fence_tag must not be empty".into()));
        }
        if self.log_directory.to_string_lossy().contains(FIELD_SEPARATOR) {
            return Err(PlannerError::Config(format!(
                "log_directory {} contains '{FIELD_SEPARATOR}', which the run log uses as a separator",
                self.log_directory.display()
            )));
        }
        for spec in &self.models {
            if spec.name.contains(FIELD_SEPARATOR) {
                return Err(PlannerError::Config(format!(
                    "model name '{}' contains '{FIELD_SEPARATOR}', which the run log uses as a separator",
                    spec.name
                )));
            }
            if spec.multimodal && spec.backend == BackendKind::OpenAi {
                return Err(PlannerError::Config(format!(
                    "model {} is marked multimodal but the openai backend is text only",
                    spec.name
                )));
            }
            if spec.multimodal && self.farm_image.is_none() {
                return Err(PlannerError::Config(format!(
                    "model {} is marked multimodal but no farm_image is configured",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Run-log file path.
    #[must_use]
    pub fn run_log_path(&self) -> PathBuf {
        self.run_log
            .clone()
            .unwrap_or_else(|| self.log_directory.join(DEFAULT_RUN_LOG))
    }

    /// Artifact write time limit.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.write_secs)
    }

    /// Retry policy for every session of the sweep.
    #[must_use]
    pub const fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_retries: self.max_retries,
            feedback: self.retry.feedback,
            persist_context_across_retries: self.retry.persist_context_across_retries,
            ask_timeout: Duration::from_secs(self.timeouts.ask_secs),
            validate_timeout: Duration::from_secs(self.timeouts.validate_secs),
        }
    }

    /// Connection settings for backend construction.
    #[must_use]
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            token: self.token.clone(),
            openai_base_url: self.openai_base_url.clone(),
            ollama_host: self.ollama_host.clone(),
            max_tokens: self.max_tokens,
            http_timeout: Duration::from_secs(self.timeouts.ask_secs),
        }
    }

    /// Primer sources for `spec`; the image is attached only for multimodal models.
    #[must_use]
    pub fn context_sources(&self, spec: &ModelSpec) -> ContextSources {
        let sources = ContextSources::new(self.schema.clone(), self.farm_layout.clone());
        match (&self.farm_image, spec.multimodal) {
            (Some(image), true) => sources.with_image(image.clone()),
            _ => sources,
        }
    }

    /// Builds the configured validator.
    pub fn build_validator(&self) -> Result<Arc<dyn SchemaValidator>, PlannerError> {
        let validator: Arc<dyn SchemaValidator> = match &self.validator {
            ValidatorConfig::Command { program, args } => Arc::new(CommandValidator::new(
                program,
                args.clone(),
                self.schema.clone(),
            )?),
            ValidatorConfig::JsonSchema => Arc::new(JsonSchemaValidator::from_path(&self.schema)?),
        };
        Ok(validator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
schema: schemas/mission.xsd
farm_layout: data/layout.txt
log_directory: out
inputs: data/inputs.txt
models:
  - name: llama3
    backend: ollama
";

    #[test]
    fn minimal_config_gets_defaults() {
        let config = PlannerConfig::from_yaml_str(MINIMAL).unwrap();

        assert_eq!(config.logging, "info");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperatures, vec![0.0]);
        assert_eq!(config.fence_tag, "xml");
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.run_log_path(), PathBuf::from("out/outputs.txt"));
        assert_eq!(config.validator, ValidatorConfig::default());
        assert_eq!(config.retry, RetrySettings::default());
        assert_eq!(config.write_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn full_config_is_honored() {
        let yaml = format!(
            "{MINIMAL}
  - name: gpt-4o
    backend: openai
temperatures: [0.0, 0.7]
max_retries: 5
run_log: runs/log.txt
validator:
  kind: json_schema
retry:
  feedback: cumulative
  persist_context_across_retries: false
timeouts:
  ask_secs: 10
"
        );
        let config = PlannerConfig::from_yaml_str(&yaml).unwrap();

        assert_eq!(config.models.len(), 2);
        assert_eq!(config.run_log_path(), PathBuf::from("runs/log.txt"));
        assert_eq!(config.validator, ValidatorConfig::JsonSchema);

        let orchestrator = config.orchestrator_config();
        assert_eq!(orchestrator.max_retries, 5);
        assert_eq!(orchestrator.feedback, FeedbackMode::Cumulative);
        assert!(!orchestrator.persist_context_across_retries);
        assert_eq!(orchestrator.ask_timeout, Duration::from_secs(10));
        assert_eq!(orchestrator.validate_timeout, Duration::from_secs(60));
    }

    #[test]
    fn command_validator_defaults_fill_missing_fields() {
        let yaml = format!("{MINIMAL}validator:\n  kind: command\n  program: xmlstarlet\n");
        let config = PlannerConfig::from_yaml_str(&yaml).unwrap();
        match config.validator {
            ValidatorConfig::Command { program, args } => {
                assert_eq!(program, "xmlstarlet");
                assert_eq!(args, default_args());
            }
            ValidatorConfig::JsonSchema => panic!("expected command validator"),
        }
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let yaml = format!("{MINIMAL}temperatures: [0.5, 2.5]\n");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&yaml),
            Err(PlannerError::Config(msg)) if msg.contains("2.5")
        ));
    }

    #[test]
    fn rejects_empty_lists_and_zero_timeouts() {
        let no_temps = format!("{MINIMAL}temperatures: []\n");
        assert!(PlannerConfig::from_yaml_str(&no_temps).is_err());

        let zero = format!("{MINIMAL}timeouts:\n  validate_secs: 0\n");
        assert!(PlannerConfig::from_yaml_str(&zero).is_err());

        let no_models = MINIMAL.replace("models:\n  - name: llama3\n    backend: ollama\n", "models: []\n");
        assert!(PlannerConfig::from_yaml_str(&no_models).is_err());
    }

    #[test]
    fn multimodal_requires_an_image_capable_backend_and_an_image() {
        let hosted = MINIMAL.replace("backend: ollama", "backend: openai\n    multimodal: true");
        let with_image = format!("{hosted}farm_image: data/farm.png\n");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&with_image),
            Err(PlannerError::Config(msg)) if msg.contains("text only")
        ));

        let local = MINIMAL.replace("backend: ollama", "backend: ollama\n    multimodal: true");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&local),
            Err(PlannerError::Config(msg)) if msg.contains("farm_image")
        ));
    }

    #[test]
    fn image_is_attached_only_for_multimodal_models() {
        let yaml = format!(
            "{MINIMAL}  - name: llava\n    backend: ollama\n    multimodal: true\nfarm_image: data/farm.png\n"
        );
        let config = PlannerConfig::from_yaml_str(&yaml).unwrap();

        assert!(config.context_sources(&config.models[0]).image.is_none());
        assert_eq!(
            config.context_sources(&config.models[1]).image,
            Some(PathBuf::from("data/farm.png"))
        );
    }

    #[test]
    fn names_that_would_break_run_log_lines_are_rejected() {
        let model = MINIMAL.replace("name: llama3", "name: \"llama3, tuned\"");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&model),
            Err(PlannerError::Config(msg)) if msg.contains("llama3, tuned")
        ));

        let directory = MINIMAL.replace("log_directory: out", "log_directory: \"runs, march\"");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&directory),
            Err(PlannerError::Config(msg)) if msg.contains("log_directory")
        ));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let yaml = MINIMAL.replace("backend: ollama", "backend: bard");
        assert!(matches!(
            PlannerConfig::from_yaml_str(&yaml),
            Err(PlannerError::Config(_))
        ));
    }
}
