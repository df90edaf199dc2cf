//! Tool trait and built-in mock tool implementations.
//!
//! The agent engine uses this crate to expose executable capabilities.
//! The built-in tools are deliberately side-effect free lookups so the
//! confirmation flow can be exercised without touching the outside
//! world.

pub mod family;
pub mod weather;

pub use family::{FamilyMemberTool, FamilyNamesTool};
pub use weather::WeatherTool;

use async_trait::async_trait;
use proto::ToolResult;

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name exposed to the LLM.
    fn name(&self) -> &str;
    /// Human-readable description for tool selection.
    fn description(&self) -> &str;
    /// JSON schema for accepted tool arguments.
    fn parameters_schema(&self) -> serde_json::Value;
    /// Whether invoking this tool needs explicit user confirmation.
    /// Tools returning `false` are resumed automatically.
    fn requires_confirmation(&self) -> bool {
        true
    }
    /// Executes the tool with the given call id and JSON args.
    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult;
}
