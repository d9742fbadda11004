use crate::types::ChatMessage;

/// Multi-turn context owned by one session.
///
/// Primer messages (system text and an optional image-bearing user message)
/// survive [`Conversation::reset`]; turns do not.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    primer: Vec<ChatMessage>,
    turns: Vec<ChatMessage>,
}

impl Conversation {
    /// Returns an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the primer.
    pub fn push_primer(&mut self, message: ChatMessage) {
        self.primer.push(message);
    }

    /// Builds the message list for the next request.
    #[must_use]
    pub fn request_messages(&self, prompt: &str, continue_context: bool) -> Vec<ChatMessage> {
        let mut messages = self.primer.clone();
        if continue_context {
            messages.extend(self.turns.iter().cloned());
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Records a completed turn.
    pub fn record_turn(&mut self, prompt: &str, reply: &str) {
        self.turns.push(ChatMessage::user(prompt));
        self.turns.push(ChatMessage::assistant(reply));
    }

    /// Drops all turns, keeping the primer.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Drops everything, primer included.
    pub fn clear(&mut self) {
        self.primer.clear();
        self.turns.clear();
    }

    /// Whether any primer message carries an image.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.primer.iter().any(|m| !m.images.is_empty())
    }

    /// Number of recorded user/assistant pairs.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len() / 2
    }
}
