pub mod context;
pub mod loop_;
pub mod registry;
pub mod repl;

pub use context::ContextBuilder;
pub use loop_::AgentLoop;
pub use registry::{ToolLookup, ToolRegistry};
pub use repl::{Repl, ReplExit, ReplOptions};
