use crate::agent::registry::ToolLookup;
use crate::agent::{ContextBuilder, ToolRegistry};
use crate::error::{AgentError, ProviderError};
use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Memory, Provider, ToolCall};
use std::sync::Arc;
use tracing::{debug, warn};

/// One conversation session: the model, the prompt assembler, the tools and
/// the memory they share. Runs a single exchange per [`AgentLoop::process`].
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    context_builder: ContextBuilder,
    tool_registry: Arc<ToolRegistry>,
    memory: Box<dyn Memory>,
    tools_enabled: bool,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        context_builder: ContextBuilder,
        tool_registry: Arc<ToolRegistry>,
        memory: Box<dyn Memory>,
    ) -> Self {
        Self {
            provider,
            context_builder,
            tool_registry,
            memory,
            tools_enabled: true,
        }
    }

    pub fn with_tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    pub fn memory(&self) -> &dyn Memory {
        self.memory.as_ref()
    }

    /// Runs one exchange and returns the final answer.
    ///
    /// Memory is only written once the answer is known; any error leaves it
    /// untouched.
    pub async fn process(&mut self, message: &str) -> Result<String, AgentError> {
        let history = self.memory.load_history().map_err(AgentError::Memory)?;
        let mut messages = self.context_builder.build_messages(&history, message);

        let tools = if self.tools_enabled && !self.tool_registry.is_empty() {
            Some(self.tool_registry.specs())
        } else {
            None
        };

        let request = ChatRequest {
            messages: &messages,
            tools: tools.as_deref(),
        };
        let response = self.provider.chat(request).await?;

        let answer = if response.has_tool_calls() {
            self.answer_with_tools(&mut messages, response).await?
        } else {
            final_text(response)?
        };

        self.memory
            .save_turn(message, &answer)
            .map_err(AgentError::Memory)?;

        Ok(answer)
    }

    /// Executes the requested tools, then asks the model again with the
    /// results appended. The second call advertises no tools.
    async fn answer_with_tools(
        &self,
        messages: &mut Vec<ChatMessage>,
        response: ChatResponse,
    ) -> Result<String, AgentError> {
        let results = self.run_tool_calls(&response.tool_calls).await?;

        messages.push(ChatMessage::assistant_with_tool_calls(
            response.text.unwrap_or_default(),
            response.tool_calls,
        ));
        messages.extend(results);

        debug!(messages = messages.len(), "sending tool results");

        let request = ChatRequest {
            messages: messages.as_slice(),
            tools: None,
        };
        let second = self.provider.chat(request).await?;

        final_text(second)
    }

    async fn run_tool_calls(&self, calls: &[ToolCall]) -> Result<Vec<ChatMessage>, AgentError> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let content = match self.tool_registry.find(&call.name) {
                ToolLookup::Found(tool) => {
                    let args = parse_arguments(call)?;
                    self.tool_registry.execute(tool.as_ref(), args).await?
                }
                ToolLookup::NotFound => {
                    warn!(tool = %call.name, "model requested an unknown tool");
                    format!("Tool '{}' not found", call.name)
                }
            };

            results.push(ChatMessage::tool_result(call, content));
        }

        Ok(results)
    }
}

fn parse_arguments(call: &ToolCall) -> Result<serde_json::Value, AgentError> {
    if call.arguments.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }

    serde_json::from_str(&call.arguments).map_err(|source| AgentError::InvalidToolArguments {
        name: call.name.clone(),
        source,
    })
}

fn final_text(response: ChatResponse) -> Result<String, AgentError> {
    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyResponse.into()),
    }
}
