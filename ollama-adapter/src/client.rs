//! HTTP execution against a local Ollama daemon.

use crate::error::OllamaError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ModelOptions, OllamaConfig, TagsResponse};

/// Client for one model on an Ollama daemon.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Creates a client; no request is made until the first call.
    ///
    /// # Errors
    /// Returns `OllamaError::Http` if the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self, OllamaError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.host.trim_end_matches('/'))
    }

    async fn error_from(response: reqwest::Response) -> OllamaError {
        OllamaError::Api {
            status: response.status().as_u16(),
            body: response.text().await.unwrap_or_default(),
        }
    }

    /// Sends `messages` to `/api/chat` without streaming and returns the reply text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OllamaError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: ModelOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint("api/chat"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        tracing::debug!(
            model = %self.config.model,
            eval_count = parsed.eval_count,
            total_duration_ns = parsed.total_duration,
            "ollama chat finished"
        );

        parsed
            .message
            .map(|m| m.content)
            .ok_or(OllamaError::EmptyResponse)
    }

    /// Verifies the daemon is reachable and the configured model is pulled.
    pub async fn check_health(&self) -> Result<(), OllamaError> {
        let response = self.http.get(self.endpoint("api/tags")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let tags: TagsResponse = response.json().await?;
        let wanted = &self.config.model;
        let latest = format!("{wanted}:latest");
        if tags
            .models
            .iter()
            .any(|tag| &tag.name == wanted || tag.name == latest)
        {
            Ok(())
        } else {
            Err(OllamaError::ModelNotFound {
                model: wanted.clone(),
                host: self.config.host.clone(),
            })
        }
    }

    /// Asks the daemon to unload the model from memory immediately.
    pub async fn unload(&self) -> Result<(), OllamaError> {
        let response = self
            .http
            .post(self.endpoint("api/generate"))
            .json(&serde_json::json!({
                "model": &self.config.model,
                "keep_alive": 0
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}
