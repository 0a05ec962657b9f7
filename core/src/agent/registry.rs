use crate::error::AgentError;
use crate::tools::CurrentAgeTool;
use crate::traits::{Tool, ToolSpec};
use std::sync::Arc;

/// Outcome of looking a tool up by the name the model asked for.
pub enum ToolLookup {
    Found(Arc<dyn Tool>),
    NotFound,
}

/// Fixed set of tools, assembled before the registry is shared.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CurrentAgeTool));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn find(&self, name: &str) -> ToolLookup {
        match self.get(name) {
            Some(tool) => ToolLookup::Found(tool),
            None => ToolLookup::NotFound,
        }
    }

    pub async fn execute(
        &self,
        tool: &dyn Tool,
        args: serde_json::Value,
    ) -> Result<String, AgentError> {
        tool.execute(args)
            .await
            .map_err(|source| AgentError::ToolExecution {
                name: tool.name().to_string(),
                source,
            })
    }
}
