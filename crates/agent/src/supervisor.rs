//! Confirmation supervisor: the human-in-the-loop state machine wrapped
//! around a pausable engine.
//!
//! Every turn is dispatched on a control state computed fresh from the
//! engine's pause marker and the incoming reply. Approval resumes the
//! paused run; rejection threads a synthetic tool failure plus the new
//! user turn back into the transcript and restarts reasoning;
//! auto-approved tools are resumed without asking, bounded by the
//! policy's chain limit.

use std::sync::Arc;

use dashmap::DashMap;
use proto::{
    AgentMessage, AgentReply, ApprovalPolicy, EngineError, Result, Role, SessionId, ToolCall,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::confirm::{ControlState, control_state};
use crate::engine::{Engine, EngineOutcome, EngineState};

/// Re-prompt returned for an unclassifiable confirmation reply.
pub const INVALID_CONFIRMATION_REPLY: &str =
    "Not a valid confirmation. Please reply would you like to proceed(yes/no or accept/reject)?";

/// Synthetic tool-result content recorded for a rejected call.
const REJECTED_TOOL_RESULT: &str = "Tool call rejected";

/// The confirmation state machine
pub struct Supervisor {
    engine: Arc<dyn Engine>,
    policy: ApprovalPolicy,
    /// One in-flight turn per session: turns for the same key race on
    /// the pause marker and transcript otherwise.
    turn_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl Supervisor {
    /// Creates a supervisor over an engine with the given approval policy.
    pub fn new(engine: Arc<dyn Engine>, policy: ApprovalPolicy) -> Self {
        Self {
            engine,
            policy,
            turn_locks: DashMap::new(),
        }
    }

    /// Processes one user turn for a session.
    ///
    /// Returns the agent's final answer, a confirmation prompt for a
    /// pending tool call, or the invalid-confirmation re-prompt. `logs`
    /// carries the transcript entries appended during the turn.
    pub async fn invoke(&self, session_id: &SessionId, input: &str) -> Result<AgentReply> {
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;

        let state = self.engine.state(session_id).await?;
        let pending = required_pending(&state)?.cloned();
        let turn_start = state.transcript.len();

        let outcome = match control_state(pending.is_some(), Some(input)) {
            ControlState::InvalidConfirmation => {
                debug!("Session {session_id}: unclassifiable confirmation reply");
                return Ok(AgentReply::text(INVALID_CONFIRMATION_REPLY));
            }
            ControlState::Resume => {
                info!("Session {session_id}: pending tool call approved");
                self.engine.resume(session_id).await?
            }
            ControlState::Reject => match pending {
                Some(call) => {
                    info!("Session {session_id}: pending call '{}' rejected", call.name);
                    self.reject(session_id, state.transcript, &call, input)
                        .await?
                }
                None => return Err(EngineError::PendingCallMissing.into()),
            },
            ControlState::Normal => self.engine.run(session_id, input).await?,
        };

        let outcome = self.drain_auto_approvals(session_id, outcome).await?;

        // A pause that survived the drain needs a human decision.
        let state = self.engine.state(session_id).await?;
        let text = match required_pending(&state)? {
            Some(call) => confirmation_prompt(state.last_assistant_content(), call),
            None => outcome.final_text,
        };
        let logs = state
            .transcript
            .get(turn_start..)
            .map(|appended| appended.to_vec())
            .unwrap_or_default();
        Ok(AgentReply::with_logs(text, logs))
    }

    /// Records the rejection and the fresh user turn, then restarts
    /// reasoning from the top of the decision loop.
    ///
    /// The two synthetic messages are written back in one store
    /// transaction before the engine is touched.
    async fn reject(
        &self,
        session_id: &SessionId,
        mut transcript: Vec<AgentMessage>,
        call: &ToolCall,
        input: &str,
    ) -> Result<EngineOutcome> {
        transcript.push(AgentMessage::tool_result(
            session_id.clone(),
            &call.id,
            &call.name,
            REJECTED_TOOL_RESULT,
        ));
        transcript.push(AgentMessage::new(session_id.clone(), Role::User, input));
        self.engine.update_transcript(session_id, transcript).await?;
        self.engine.restart_reasoning(session_id).await
    }

    /// Resumes through any chain of auto-approved pauses.
    ///
    /// Stops at the first confirmation-requiring pause or when the run
    /// completes. A chain longer than the policy bound aborts the drain
    /// with [`EngineError::AutoApprovalLoop`] instead of resuming on.
    async fn drain_auto_approvals(
        &self,
        session_id: &SessionId,
        outcome: EngineOutcome,
    ) -> Result<EngineOutcome> {
        let mut outcome = outcome;
        let mut chain = 0usize;
        loop {
            let state = self.engine.state(session_id).await?;
            let Some(call) = required_pending(&state)? else {
                return Ok(outcome);
            };
            if !self.policy.is_auto_approved(&call.name) {
                return Ok(outcome);
            }
            if chain >= self.policy.max_auto_approvals() {
                warn!(
                    "Session {session_id}: auto-approval chain exceeded {chain} resumes on '{}'",
                    call.name
                );
                return Err(EngineError::AutoApprovalLoop(chain).into());
            }
            chain += 1;
            debug!(
                "Session {session_id}: auto-approving '{}' (resume {chain})",
                call.name
            );
            outcome = self.engine.resume(session_id).await?;
        }
    }

    fn turn_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// The pending call, enforcing the pause invariant: a reported pause
/// with no retrievable tool call is an error, not a silent `None`.
fn required_pending(state: &EngineState) -> Result<Option<&ToolCall>> {
    if !state.is_paused() {
        return Ok(None);
    }
    match state.pending_call() {
        Some(call) => Ok(Some(call)),
        None => Err(EngineError::PendingCallMissing.into()),
    }
}

/// Formats the confirmation prompt shown for a pending tool call.
fn confirmation_prompt(content: &str, call: &ToolCall) -> String {
    format!(
        "{content}\n\n\
         The Agent wants to make a tool call with the parameter:\n\
         {{\n\
         \t\"name\": \"{}\"\n\
         \t\"args\": \"{}\"\n\
         }}\n\
         Would you like to proceed?",
        call.name, call.arguments
    )
}
