use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tool invocation proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id linking this call to its eventual result.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments for the invocation.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a tool call with a fresh correlation id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// Schema of one tool as advertised to the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description for tool selection.
    pub description: String,
    /// JSON schema for accepted arguments.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a tool definition from name, description, and schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Output of one tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Correlation id of the tool call this result answers.
    pub call_id: String,
    /// Name of the executed tool.
    pub tool_name: String,
    /// Result payload (JSON text or plain text).
    pub output: String,
    /// Whether the execution failed.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: output.into(),
            is_error: false,
        }
    }

    /// Creates a failed tool result.
    pub fn error(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: output.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_new_assigns_unique_ids() {
        let a = ToolCall::new("get_weather", serde_json::json!({"location":"Seoul"}));
        let b = ToolCall::new("get_weather", serde_json::json!({"location":"Seoul"}));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "get_weather");
        assert_eq!(a.arguments["location"], "Seoul");
    }

    #[test]
    fn tool_definition_new_sets_fields() {
        let def = ToolDefinition::new(
            "get_family_names",
            "List family members",
            serde_json::json!({"type":"object","properties":{}}),
        );
        assert_eq!(def.name, "get_family_names");
        assert_eq!(def.description, "List family members");
        assert_eq!(def.parameters["type"], "object");
    }

    #[test]
    fn tool_result_success_and_error_flags() {
        let ok = ToolResult::success("c1", "get_weather", "{}");
        assert!(!ok.is_error);
        assert_eq!(ok.call_id, "c1");

        let failed = ToolResult::error("c2", "get_weather", "boom");
        assert!(failed.is_error);
        assert_eq!(failed.output, "boom");
    }
}
