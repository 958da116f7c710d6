// ABOUTME: Defines all error types for the relay library using thiserror.
// ABOUTME: Each submodule has its own error enum, unified under RelayError.

/// Top-level error type for the relay library.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Coordination error: {0}")]
    Coordination(#[from] CoordinationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Errors from driving a wrapped agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Stream ended without a final event")]
    StreamClosed,

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("HITL requires a suspendable agent: {0}")]
    IncompatibleHitl(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

/// Errors from the pending-result coordination lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No session registered for tool call '{0}'")]
    MissingSession(String),

    #[error("No pending entry for tool call '{0}'")]
    UnknownOuterCall(String),
}

/// Errors from session storage.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}
