//! Local Ollama backend, with optional image priming.

use async_trait::async_trait;
use ollama_adapter::{encode_image, ChatMessage, Conversation, OllamaClient, OllamaConfig};
use std::path::Path;

use crate::model::{BackendError, ModelClient};

/// Text sent alongside the layout image.
const IMAGE_PRIMER: &str = "This image shows the layout of the operating area. \
                            Use it together with the layout description.";

/// [`ModelClient`] over a model served by Ollama.
pub struct OllamaBackend {
    client: OllamaClient,
    conversation: Conversation,
    multimodal: bool,
}

impl OllamaBackend {
    /// Builds the backend; `multimodal` enables image priming.
    pub fn new(config: OllamaConfig, multimodal: bool) -> Result<Self, BackendError> {
        Ok(Self {
            client: OllamaClient::new(config)?,
            conversation: Conversation::new(),
            multimodal,
        })
    }
}

#[async_trait]
impl ModelClient for OllamaBackend {
    fn name(&self) -> &str {
        &self.client.config().model
    }

    fn supports_images(&self) -> bool {
        self.multimodal
    }

    async fn init_context(&mut self, primer: &str) -> Result<(), BackendError> {
        self.conversation.clear();
        self.conversation.push_primer(ChatMessage::system(primer));
        Ok(())
    }

    async fn init_image_context(&mut self, image: &Path) -> Result<(), BackendError> {
        if !self.multimodal {
            return Err(BackendError::Unsupported(format!(
                "{} is not configured as multimodal",
                self.name()
            )));
        }
        let encoded = encode_image(image)?;
        self.conversation
            .push_primer(ChatMessage::user(IMAGE_PRIMER).with_image(encoded));
        tracing::debug!(model = self.name(), image = %image.display(), "image context primed");
        Ok(())
    }

    async fn ask(&mut self, prompt: &str, use_context: bool) -> Result<String, BackendError> {
        let messages = self.conversation.request_messages(prompt, use_context);
        let reply = self.client.chat(&messages).await?;
        if use_context {
            self.conversation.record_turn(prompt, &reply);
        }
        Ok(reply)
    }

    fn reset_context(&mut self) {
        self.conversation.reset();
    }

    async fn check_health(&self) -> Result<(), BackendError> {
        Ok(self.client.check_health().await?)
    }

    async fn release_resources(&mut self) -> Result<(), BackendError> {
        self.conversation.clear();
        self.client.unload().await?;
        Ok(())
    }
}
