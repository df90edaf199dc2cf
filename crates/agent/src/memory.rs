//! SQLite-backed session store: transcripts plus the engine pause marker.

use proto::{AgentMessage, Role, SessionId, StoreError};
use sqlx::{Row, sqlite::SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// Pause-marker value while a session is suspended before a tool step.
pub const NEXT_STEP_TOOLS: &str = "tools";

/// SQLite-backed conversation memory
pub struct SqliteMemory {
    pool: SqlitePool,
}

impl SqliteMemory {
    /// Open (or create) the SQLite database and run migrations
    pub async fn open(db_url: &str) -> Result<Self, StoreError> {
        // Expand ~ in path
        let url = if db_url.starts_with("~") {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            db_url.replacen("~", &home, 1)
        } else {
            db_url.to_string()
        };

        // Ensure parent directory exists
        if let Some(parent) = std::path::Path::new(&url).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Sqlx(e.to_string()))?;
        }

        let pool = SqlitePool::connect(&format!("sqlite:{url}?mode=rwc"))
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        let migrations_dir =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path())
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        migrator
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("SQLite memory opened: {url}");
        Ok(Self { pool })
    }

    /// Ensure a session exists (create if not)
    pub async fn ensure_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("INSERT OR IGNORE INTO sessions (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(session_id.as_str())
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;
        Ok(())
    }

    /// Append a message to a session's transcript
    pub async fn save_message(&self, msg: &AgentMessage) -> Result<(), StoreError> {
        let tool_calls_json = encode_tool_calls(msg)?;

        sqlx::query(
            "INSERT INTO messages (id, session_id, role, content, tool_call_id, tool_name, tool_calls_json, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&msg.id)
        .bind(msg.session_id.as_str())
        .bind(msg.role.to_string())
        .bind(&msg.content)
        .bind(&msg.tool_call_id)
        .bind(&msg.tool_name)
        .bind(tool_calls_json)
        .bind(msg.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        debug!("Saved message: {} (role: {})", msg.id, msg.role);
        Ok(())
    }

    /// Load a session's transcript in append order
    pub async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AgentMessage>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, session_id, role, content, tool_call_id, tool_name, tool_calls_json, created_at FROM messages WHERE session_id = ? ORDER BY seq ASC"
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        let messages = rows.into_iter().map(|row| decode_message(&row)).collect();
        Ok(messages)
    }

    /// Replace a session's whole transcript in one transaction.
    ///
    /// The rejection path appends a synthetic tool result and a fresh user
    /// turn together; this write-back is the atomicity boundary for that
    /// pair.
    pub async fn replace_session_messages(
        &self,
        session_id: &SessionId,
        messages: &[AgentMessage],
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        for msg in messages {
            let tool_calls_json = encode_tool_calls(msg)?;
            sqlx::query(
                "INSERT INTO messages (id, session_id, role, content, tool_call_id, tool_name, tool_calls_json, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&msg.id)
            .bind(session_id.as_str())
            .bind(msg.role.to_string())
            .bind(&msg.content)
            .bind(&msg.tool_call_id)
            .bind(&msg.tool_name)
            .bind(tool_calls_json)
            .bind(msg.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        debug!(
            "Replaced transcript for {session_id}: {} messages",
            messages.len()
        );
        Ok(())
    }

    /// Set or clear the session's pause marker
    pub async fn set_next_step(
        &self,
        session_id: &SessionId,
        step: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET next_step = ?, updated_at = ? WHERE id = ?")
            .bind(step)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;
        Ok(())
    }

    /// Read the session's pause marker; `None` for unknown sessions too
    pub async fn next_step(&self, session_id: &SessionId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT next_step FROM sessions WHERE id = ?")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        Ok(row.and_then(|r| r.get::<Option<String>, _>("next_step")))
    }

    /// Bump the session's updated_at timestamp
    pub async fn touch_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;
        Ok(())
    }

    /// List all sessions, most recently updated first
    pub async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let rows = sqlx::query("SELECT id FROM sessions ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Sqlx(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| SessionId::from(row.get::<String, _>("id")))
            .collect())
    }
}

fn encode_tool_calls(msg: &AgentMessage) -> Result<Option<String>, StoreError> {
    msg.tool_calls
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::Sqlx(e.to_string()))
}

fn decode_message(row: &sqlx::sqlite::SqliteRow) -> AgentMessage {
    let role_str: String = row.get("role");
    let role = Role::from_str(&role_str).unwrap_or(Role::User);
    let created_at_str: String = row.get("created_at");
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now());
    let tool_calls_json: Option<String> = row.get("tool_calls_json");
    let tool_calls = tool_calls_json
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Vec<proto::ToolCall>>(raw).ok());

    AgentMessage {
        id: row.get("id"),
        session_id: SessionId::from(row.get::<String, _>("session_id")),
        role,
        content: row.get("content"),
        tool_call_id: row.get("tool_call_id"),
        tool_name: row.get("tool_name"),
        tool_calls,
        created_at,
    }
}
