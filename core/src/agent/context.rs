use crate::traits::ChatMessage;

pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um assistente prestativo chamado Gema.";

/// Assembles the prompt for one exchange: system instruction, prior
/// history in order, then the new user turn. Nothing is trimmed.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    pub system_prompt: String,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ContextBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn build_messages(
        &self,
        history: &[ChatMessage],
        current_message: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(current_message));
        messages
    }
}
