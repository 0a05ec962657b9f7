use crate::traits::{ChatMessage, Memory};

/// Append-only, in-process conversation buffer.
#[derive(Debug, Default)]
pub struct BufferMemory {
    messages: Vec<ChatMessage>,
}

impl BufferMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Memory for BufferMemory {
    fn name(&self) -> &str {
        "buffer"
    }

    fn load_history(&self) -> anyhow::Result<Vec<ChatMessage>> {
        Ok(self.messages.clone())
    }

    fn save_turn(&mut self, user_input: &str, final_output: &str) -> anyhow::Result<()> {
        self.messages.push(ChatMessage::user(user_input));
        self.messages.push(ChatMessage::assistant(final_output));
        Ok(())
    }

    fn turn_count(&self) -> usize {
        self.messages.len() / 2
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}
