use crate::types::ChatMessage;

/// Multi-turn context owned by one session.
///
/// Lifecycle: primer messages are installed once, then each continued turn
/// appends a user/assistant pair, and [`Conversation::reset`] drops the turns
/// while keeping the primer.
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

    /// Appends a message to the primer that survives resets.
    pub fn push_primer(&mut self, message: ChatMessage) {
        self.primer.push(message);
    }

    /// Builds the message list for the next request.
    ///
    /// With `continue_context` the accumulated turns are included; without it
    /// only the primer precedes the prompt.
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

    /// Number of recorded user/assistant pairs.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn reset_keeps_primer_and_drops_turns() {
        let mut conv = Conversation::new();
        conv.push_primer(ChatMessage::system("be terse"));
        conv.record_turn("q1", "a1");
        assert_eq!(conv.turn_count(), 1);

        conv.reset();
        assert_eq!(conv.turn_count(), 0);

        let messages = conv.request_messages("q2", true);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "q2");
    }

    #[test]
    fn fresh_turn_skips_history() {
        let mut conv = Conversation::new();
        conv.push_primer(ChatMessage::system("primer"));
        conv.record_turn("q1", "a1");

        let continued = conv.request_messages("q2", true);
        let fresh = conv.request_messages("q2", false);

        assert_eq!(continued.len(), 4);
        assert_eq!(fresh.len(), 2);
    }
}
