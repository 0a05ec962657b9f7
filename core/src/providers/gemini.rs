//! Google Gemini `generateContent` backend.

use crate::error::ProviderError;
use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, Role, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prefix of ids minted locally when the API returns a call without one.
/// Those ids are never sent back.
const LOCAL_CALL_ID_PREFIX: &str = "gema_call_";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(Duration::from_secs(120)),
            api_key: api_key.into(),
            model: "gemini-2.0-flash".to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            temperature: 0.7,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn build_request(&self, request: ChatRequest<'_>) -> GeminiRequest {
        let (system_instruction, contents) = convert_messages(request.messages);

        GeminiRequest {
            contents,
            system_instruction,
            tools: request
                .tools
                .filter(|tools| !tools.is_empty())
                .map(|tools| vec![convert_tools(tools)]),
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Splits system turns into `systemInstruction` and maps the rest onto
/// Gemini's `user`/`model` contents. Consecutive tool results share one
/// content entry so they line up with the preceding function calls.
fn convert_messages(messages: &[ChatMessage]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let mut system_parts: Vec<&str> = vec![];
    let mut contents: Vec<GeminiContent> = vec![];
    let mut last_was_tool = false;

    for msg in messages {
        match msg.role {
            Role::System => {
                system_parts.push(&msg.content);
                last_was_tool = false;
            }
            Role::User => {
                contents.push(GeminiContent {
                    role: Some("user".into()),
                    parts: vec![GeminiPart::text(&msg.content)],
                });
                last_was_tool = false;
            }
            Role::Assistant => {
                let mut parts = vec![];
                if !msg.content.is_empty() {
                    parts.push(GeminiPart::text(&msg.content));
                }
                for call in msg.tool_calls.iter().flatten() {
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            id: api_call_id(&call.id),
                            name: call.name.clone(),
                            args: Some(
                                serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({})),
                            ),
                        }),
                        ..GeminiPart::default()
                    });
                }
                if parts.is_empty() {
                    parts.push(GeminiPart::text(""));
                }
                contents.push(GeminiContent {
                    role: Some("model".into()),
                    parts,
                });
                last_was_tool = false;
            }
            Role::Tool => {
                let part = GeminiPart {
                    function_response: Some(GeminiFunctionResponse {
                        id: msg.tool_call_id.as_deref().and_then(api_call_id),
                        name: msg.tool_name.clone().unwrap_or_default(),
                        response: json!({ "content": msg.content }),
                    }),
                    ..GeminiPart::default()
                };
                if last_was_tool && let Some(group) = contents.last_mut() {
                    group.parts.push(part);
                } else {
                    contents.push(GeminiContent {
                        role: Some("user".into()),
                        parts: vec![part],
                    });
                }
                last_was_tool = true;
            }
        }
    }

    let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
        role: None,
        parts: vec![GeminiPart::text(system_parts.join("\n\n"))],
    });

    (system_instruction, contents)
}

fn api_call_id(id: &str) -> Option<String> {
    (!id.starts_with(LOCAL_CALL_ID_PREFIX)).then(|| id.to_string())
}

fn convert_tools(tools: &[ToolSpec]) -> GeminiTool {
    GeminiTool {
        function_declarations: tools
            .iter()
            .map(|t| GeminiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: (!t.takes_no_arguments()).then(|| t.parameters_schema.clone()),
            })
            .collect(),
    }
}

fn parse_response(body: &str) -> Result<ChatResponse, ProviderError> {
    let response: GeminiResponse = serde_json::from_str(body)?;

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut text = String::new();
    let mut tool_calls = vec![];

    for part in parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            let args = call.args.unwrap_or_else(|| json!({}));
            tool_calls.push(ToolCall {
                id: call
                    .id
                    .unwrap_or_else(|| format!("{LOCAL_CALL_ID_PREFIX}{}", uuid::Uuid::new_v4().simple())),
                name: call.name,
                arguments: serde_json::to_string(&args)?,
            });
        }
    }

    if text.trim().is_empty() && tool_calls.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    Ok(ChatResponse {
        text: (!text.is_empty()).then_some(text),
        tool_calls,
    })
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let body = self.build_request(request);

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.map_or(0, |t| t.len()),
            "gemini generateContent"
        );

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&text)
    }
}
