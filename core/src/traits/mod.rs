pub mod memory;
pub mod provider;
pub mod tool;

pub use memory::Memory;
pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, Role, ToolCall};
pub use tool::{Tool, ToolSpec};
