//! Execution engine, session memory, LLM adapter, and the
//! human-in-the-loop confirmation supervisor.

pub mod confirm;
pub mod engine;
pub mod llm;
pub mod memory;
pub mod supervisor;
pub mod tool_registry;

/// Confirmation classifier and control-state derivation.
pub use confirm::{Confirmation, ControlState, classify, control_state};
/// Pausable execution engine contract and ReAct implementation.
pub use engine::{Engine, EngineOutcome, EngineState, ReactEngine, StepKind};
/// Chat request/response models and provider interfaces.
pub use llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, OpenAiProvider, TokenUsage};
/// SQLite-backed conversation memory implementation.
pub use memory::SqliteMemory;
/// The confirmation state machine wrapped around an engine.
pub use supervisor::{INVALID_CONFIRMATION_REPLY, Supervisor};
/// Runtime tool registry.
pub use tool_registry::ToolRegistry;
