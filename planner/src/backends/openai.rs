//! Hosted chat-completions backend.

use async_trait::async_trait;
use openai_adapter::{ChatMessage, Conversation, OpenAiClient, OpenAiConfig};

use crate::model::{BackendError, ModelClient};

/// [`ModelClient`] over a hosted chat-completions API. Text only.
pub struct OpenAiBackend {
    client: OpenAiClient,
    conversation: Conversation,
}

impl OpenAiBackend {
    /// Builds the backend; the conversation starts empty.
    pub fn new(config: OpenAiConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: OpenAiClient::new(config)?,
            conversation: Conversation::new(),
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiBackend {
    fn name(&self) -> &str {
        &self.client.config().model
    }

    async fn init_context(&mut self, primer: &str) -> Result<(), BackendError> {
        self.conversation.clear();
        self.conversation.push_primer(ChatMessage::system(primer));
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
        Ok(())
    }
}
