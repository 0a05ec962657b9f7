pub mod agent;
pub mod config;
pub mod error;
pub mod memory;
pub mod providers;
pub mod tools;
pub mod traits;

#[cfg(test)]
mod testing;

pub use agent::{AgentLoop, ContextBuilder, Repl, ReplExit, ReplOptions, ToolRegistry};
pub use config::Config;
pub use error::{AgentError, ProviderError};
pub use memory::{BufferMemory, create_memory};
pub use providers::{GeminiProvider, OpenAIProvider, create_provider};
pub use tools::{CURRENT_AGE_TOOL, CurrentAgeTool};
pub use traits::{
    ChatMessage, ChatRequest, ChatResponse, Memory, Provider, Role, Tool, ToolCall, ToolSpec,
};
