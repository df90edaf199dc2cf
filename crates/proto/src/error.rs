use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool registration/execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Session store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Execution engine / supervisor error.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Internal protocol type error.
    #[error("Proto error: {0}")]
    Proto(#[from] ProtoError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// LLM provider errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Remote API failure.
    #[error("{0}")]
    Api(String),

    /// Provider throttled the request.
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Provider response schema/content was invalid.
    #[error("Invalid response from LLM: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Tool execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Requested tool is unknown.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool operation failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool call arguments are invalid.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Session store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLx operation error.
    #[error("SQLx error: {0}")]
    Sqlx(String),

    /// Migration execution error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Requested record was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Execution engine and confirmation supervisor errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine reported a tool pause but no tool call is retrievable
    /// from the transcript. Session state is left untouched.
    #[error("Paused on a tool step but no pending tool call is retrievable")]
    PendingCallMissing,

    /// A chain of auto-approved resumes exceeded the configured bound.
    #[error("Auto-approval chain exceeded {0} resumes")]
    AutoApprovalLoop(usize),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Invalid role string value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Generic serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_config_error_variant() {
        let err = ConfigError::MissingField("llm.api_key".to_string());
        assert!(err.to_string().contains("Missing required field"));
    }

    #[test]
    fn wraps_llm_error_into_top_level_error() {
        let err: Error = LlmError::RateLimit.into();
        assert!(err.to_string().contains("Rate limit"));
    }

    #[test]
    fn wraps_engine_errors_with_context() {
        let missing: Error = EngineError::PendingCallMissing.into();
        assert!(missing.to_string().contains("no pending tool call"));

        let looped: Error = EngineError::AutoApprovalLoop(8).into();
        assert!(looped.to_string().contains("exceeded 8 resumes"));
    }

    #[test]
    fn wraps_tool_and_store_errors() {
        let tool_err: Error = ToolError::NotFound("get_weather".to_string()).into();
        assert!(tool_err.to_string().contains("Tool error"));

        let store_err: Error = StoreError::Migration("bad sql".to_string()).into();
        assert!(store_err.to_string().contains("Store error"));
    }

    #[test]
    fn wraps_proto_error_into_top_level_error() {
        let err: Error = ProtoError::InvalidRole("owner".to_string()).into();
        assert!(err.to_string().contains("Invalid role"));
    }
}
