use thiserror::Error;

/// Failure reaching or decoding a response from the hosted model.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty response from API: no content or tool calls")]
    EmptyResponse,
}

/// Failure of a single exchange. Always recoverable by the REPL.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("tool '{name}' failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid arguments for tool '{name}': {source}")]
    InvalidToolArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("memory error: {0}")]
    Memory(#[source] anyhow::Error),
}
