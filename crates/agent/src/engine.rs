//! Pausable execution engine: a ReAct loop that suspends immediately
//! before every tool-execution step.
//!
//! The engine never executes a tool on its own. When the model proposes
//! a call, the proposal is persisted, the session's pause marker is set,
//! and control returns to the caller. [`Engine::resume`] executes the
//! pending call and reasons again; [`Engine::restart_reasoning`] discards
//! the pending call and reasons over the stored transcript as-is.

use std::sync::Arc;

use async_trait::async_trait;
use proto::{AgentMessage, EngineError, LlmError, Result, Role, SessionId, ToolCall};
use tracing::{debug, info, warn};

use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::memory::{NEXT_STEP_TOOLS, SqliteMemory};
use crate::tool_registry::ToolRegistry;

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a personal assistant agent.
You can call tools to answer questions about the weather and the user's family.
Every tool call is reviewed before it runs; keep calls purposeful and answer concisely."#;

const MAX_CONTEXT_MESSAGES: usize = 40;
const MAX_TOOL_RESULT_CHARS: usize = 16_000;

/// Kind of step the engine is suspended before.
///
/// Only tool-execution pauses exist; the variant is explicit so the pause
/// marker reads as a step kind rather than a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Suspended immediately before executing a proposed tool call.
    Tools,
}

/// Snapshot of a session's execution state
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Pause marker; `None` while the session is not suspended.
    pub next_step: Option<StepKind>,
    /// The session's transcript in order.
    pub transcript: Vec<AgentMessage>,
}

impl EngineState {
    /// Whether the session is suspended before a tool step.
    pub fn is_paused(&self) -> bool {
        matches!(self.next_step, Some(StepKind::Tools))
    }

    /// The tool call awaiting approval, derived from the transcript.
    ///
    /// Exists iff the session is paused and the most recent assistant
    /// message proposes a call.
    pub fn pending_call(&self) -> Option<&ToolCall> {
        if !self.is_paused() {
            return None;
        }
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .and_then(|m| m.first_tool_call())
    }

    /// Content of the most recent assistant message, empty if none.
    pub fn last_assistant_content(&self) -> &str {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// Result of driving the engine until it pauses or completes
#[derive(Debug)]
pub struct EngineOutcome {
    /// Final assistant text; empty when the engine paused instead.
    pub final_text: String,
    /// Transcript after the drive.
    pub transcript: Vec<AgentMessage>,
    /// Token usage of the reasoning call.
    pub usage: TokenUsage,
}

/// Contract of the pausable execution engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the session's pause marker and transcript.
    async fn state(&self, session_id: &SessionId) -> Result<EngineState>;

    /// Appends a user turn and reasons until a pause or a final answer.
    async fn run(&self, session_id: &SessionId, input: &str) -> Result<EngineOutcome>;

    /// Executes the pending tool call and reasons on.
    /// Fails with [`EngineError::PendingCallMissing`] when nothing is pending.
    async fn resume(&self, session_id: &SessionId) -> Result<EngineOutcome>;

    /// Clears the pause marker and reasons over the stored transcript
    /// from the top of the decision loop, without executing the paused
    /// tool and without new input.
    async fn restart_reasoning(&self, session_id: &SessionId) -> Result<EngineOutcome>;

    /// Replaces the session's stored transcript atomically.
    async fn update_transcript(
        &self,
        session_id: &SessionId,
        transcript: Vec<AgentMessage>,
    ) -> Result<()>;
}

/// ReAct engine over an LLM provider, tool registry, and session store
pub struct ReactEngine {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    memory: Arc<SqliteMemory>,
    model: String,
    system_prompt: String,
}

impl ReactEngine {
    /// Creates an engine with the default system prompt.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        memory: Arc<SqliteMemory>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            tools,
            memory,
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Overrides the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// One reasoning step: consult the LLM over the stored transcript,
    /// then either finish with text or pause on a proposed tool call.
    async fn step(&self, session_id: &SessionId) -> Result<EngineOutcome> {
        let transcript = self.memory.load_session(session_id).await?;
        let history = trim_transcript(transcript);
        let messages = transcript_to_chat_messages(&self.system_prompt, &history);

        let req = ChatRequest {
            messages,
            tools: self.tools.definitions(),
            model: self.model.clone(),
        };
        debug!("Reasoning step for session {session_id}");
        let response = self.llm.chat(req).await?;

        match response {
            ChatResponse::Text(text, usage) => {
                info!("Final response for session {session_id}: {text:.50}...");
                let assistant = AgentMessage::new(session_id.clone(), Role::Assistant, &text);
                self.memory.save_message(&assistant).await?;
                self.memory.set_next_step(session_id, None).await?;
                self.memory.touch_session(session_id).await?;

                let transcript = self.memory.load_session(session_id).await?;
                Ok(EngineOutcome {
                    final_text: text,
                    transcript,
                    usage,
                })
            }
            ChatResponse::ToolCalls(mut calls, usage) => {
                if calls.is_empty() {
                    return Err(LlmError::InvalidResponse(
                        "tool-call response with no calls".to_string(),
                    )
                    .into());
                }
                // One pending call per pause; extra proposals re-emerge on
                // later rounds once the first one has a result.
                if calls.len() > 1 {
                    warn!(
                        "Session {session_id}: model proposed {} calls, keeping the first",
                        calls.len()
                    );
                    calls.truncate(1);
                }
                debug!(
                    "Session {session_id} pausing before tool: {}",
                    calls[0].name
                );

                let assistant = AgentMessage::assistant_tool_calls(session_id.clone(), calls);
                self.memory.save_message(&assistant).await?;
                self.memory
                    .set_next_step(session_id, Some(NEXT_STEP_TOOLS))
                    .await?;
                self.memory.touch_session(session_id).await?;

                let transcript = self.memory.load_session(session_id).await?;
                Ok(EngineOutcome {
                    final_text: String::new(),
                    transcript,
                    usage,
                })
            }
        }
    }
}

#[async_trait]
impl Engine for ReactEngine {
    async fn state(&self, session_id: &SessionId) -> Result<EngineState> {
        let next_step = match self.memory.next_step(session_id).await?.as_deref() {
            Some(NEXT_STEP_TOOLS) => Some(StepKind::Tools),
            _ => None,
        };
        let transcript = self.memory.load_session(session_id).await?;
        Ok(EngineState {
            next_step,
            transcript,
        })
    }

    async fn run(&self, session_id: &SessionId, input: &str) -> Result<EngineOutcome> {
        self.memory.ensure_session(session_id).await?;
        let user_msg = AgentMessage::new(session_id.clone(), Role::User, input);
        self.memory.save_message(&user_msg).await?;
        self.step(session_id).await
    }

    async fn resume(&self, session_id: &SessionId) -> Result<EngineOutcome> {
        let state = self.state(session_id).await?;
        let call = match state.pending_call() {
            Some(call) => call.clone(),
            None => return Err(EngineError::PendingCallMissing.into()),
        };

        let result = self
            .tools
            .execute(&call.id, &call.name, call.arguments.clone())
            .await;
        let tool_msg = AgentMessage::tool_result(
            session_id.clone(),
            &call.id,
            &call.name,
            &result.output,
        );
        self.memory.save_message(&tool_msg).await?;
        self.memory.set_next_step(session_id, None).await?;

        self.step(session_id).await
    }

    async fn restart_reasoning(&self, session_id: &SessionId) -> Result<EngineOutcome> {
        self.memory.set_next_step(session_id, None).await?;
        self.step(session_id).await
    }

    async fn update_transcript(
        &self,
        session_id: &SessionId,
        transcript: Vec<AgentMessage>,
    ) -> Result<()> {
        self.memory
            .replace_session_messages(session_id, &transcript)
            .await?;
        self.memory.touch_session(session_id).await?;
        Ok(())
    }
}

/// Trims a loaded transcript to the context window while keeping the
/// cut aligned to a user boundary, so tool calls keep their results.
fn trim_transcript(transcript: Vec<AgentMessage>) -> Vec<AgentMessage> {
    if transcript.len() <= MAX_CONTEXT_MESSAGES {
        return transcript;
    }

    let start = transcript.len() - MAX_CONTEXT_MESSAGES;
    let offset = transcript[start..]
        .iter()
        .position(|m| m.role == Role::User)
        .unwrap_or(0);
    transcript[start + offset..].to_vec()
}

/// Converts the stored transcript into model input messages, including
/// tool-output truncation safeguards.
fn transcript_to_chat_messages(
    system_prompt: &str,
    transcript: &[AgentMessage],
) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = vec![ChatMessage::system(system_prompt)];
    for msg in transcript {
        match msg.role {
            Role::User => messages.push(ChatMessage::user(&msg.content)),
            Role::Assistant => {
                let mut assistant = ChatMessage::assistant(&msg.content);
                assistant.tool_calls = msg.tool_calls.clone();
                messages.push(assistant);
            }
            Role::Tool => {
                let content = truncate_tool_result(&msg.content, MAX_TOOL_RESULT_CHARS);
                messages.push(ChatMessage::tool_result(
                    msg.tool_call_id.as_deref().unwrap_or(""),
                    msg.tool_name.as_deref().unwrap_or(""),
                    &content,
                ));
            }
            Role::System => {} // skip stored system messages
        }
    }
    messages
}

/// Truncates a tool result to at most `max_chars` characters.
fn truncate_tool_result(output: &str, max_chars: usize) -> String {
    let total_chars = output.chars().count();
    if total_chars <= max_chars {
        return output.to_string();
    }

    let kept = output.chars().take(max_chars).collect::<String>();
    let cut = total_chars - max_chars;
    format!("{kept}\n...[output truncated: {cut} chars omitted]")
}
