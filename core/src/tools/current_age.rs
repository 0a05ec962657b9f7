use crate::traits::Tool;
use async_trait::async_trait;
use serde_json::json;

pub const CURRENT_AGE_TOOL: &str = "obter_idade_atual";

const CURRENT_AGE: u32 = 30;

/// Reports a fixed age. Arguments are accepted and ignored.
pub struct CurrentAgeTool;

#[async_trait]
impl Tool for CurrentAgeTool {
    fn name(&self) -> &str {
        CURRENT_AGE_TOOL
    }

    fn description(&self) -> &str {
        "Obtém a idade atual do usuário. Use quando perguntarem sobre a idade."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<String> {
        tracing::info!(tool = CURRENT_AGE_TOOL, "tool invoked");
        Ok(format!("A idade atual é {} anos.", CURRENT_AGE))
    }
}
