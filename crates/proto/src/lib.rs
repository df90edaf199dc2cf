//! Shared protocol types for the agent engine, tools, and the
//! confirmation supervisor.
//!
//! This crate defines the serializable conversation/message structures,
//! tool call types, the approval policy object, and the strongly-typed
//! error enums shared across the workspace.

pub mod approval;
pub mod error;
pub mod message;
pub mod reply;
pub mod tool;

/// Re-export of the tool approval policy.
pub use approval::ApprovalPolicy;
/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of conversation/message identity types.
pub use message::{AgentMessage, Role, SessionId};
/// Re-export of the caller-facing turn reply.
pub use reply::AgentReply;
/// Re-export of tool call definition and result types.
pub use tool::{ToolCall, ToolDefinition, ToolResult};
