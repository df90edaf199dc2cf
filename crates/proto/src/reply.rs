use serde::{Deserialize, Serialize};

use crate::message::AgentMessage;

/// Outcome of one supervised turn returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// Final text for the user: the agent's answer, a confirmation
    /// prompt, or the invalid-confirmation re-prompt.
    pub text: String,
    /// Transcript entries appended during this turn, in order.
    /// Empty when the turn did not touch the engine.
    pub logs: Vec<AgentMessage>,
}

impl AgentReply {
    /// Creates a reply carrying only text, with no transcript activity.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            logs: Vec::new(),
        }
    }

    /// Creates a reply with text and the messages appended this turn.
    pub fn with_logs(text: impl Into<String>, logs: Vec<AgentMessage>) -> Self {
        Self {
            text: text.into(),
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Role, SessionId};

    #[test]
    fn text_reply_has_no_logs() {
        let reply = AgentReply::text("hello");
        assert_eq!(reply.text, "hello");
        assert!(reply.logs.is_empty());
    }

    #[test]
    fn with_logs_keeps_message_order() {
        let session = SessionId::from("s1");
        let logs = vec![
            AgentMessage::new(session.clone(), Role::User, "first"),
            AgentMessage::new(session, Role::Assistant, "second"),
        ];
        let reply = AgentReply::with_logs("done", logs);
        assert_eq!(reply.logs.len(), 2);
        assert_eq!(reply.logs[0].content, "first");
        assert_eq!(reply.logs[1].content, "second");
    }
}
