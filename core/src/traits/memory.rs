use crate::traits::ChatMessage;

/// Conversation memory.
///
/// Only completed exchanges are recorded: one user turn and one assistant
/// turn each. Tool-call scaffolding never reaches the store.
pub trait Memory: Send + Sync {
    fn name(&self) -> &str;

    /// The full history in chronological order.
    fn load_history(&self) -> anyhow::Result<Vec<ChatMessage>>;

    fn save_turn(&mut self, user_input: &str, final_output: &str) -> anyhow::Result<()>;

    /// Number of saved user/assistant pairs.
    fn turn_count(&self) -> usize;

    fn clear(&mut self);
}
