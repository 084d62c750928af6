use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SENDER_USER: &str = "user";
pub const SENDER_AI: &str = "ai";

pub const SESSION_AI: &str = "ai";
pub const SESSION_MENTOR: &str = "mentor";

pub const DEFAULT_SESSION_TITLE: &str = "Chat Session";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mentor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub session_type: String,
    pub title: String,
    pub is_active: bool,
    pub last_access: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub content: String,
    pub sender_id: Option<Uuid>,
    pub sender_type: String,
    pub status: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Session row joined with its unread count and latest message.
#[derive(Debug, Clone, FromRow)]
pub struct ChatSessionOverview {
    pub id: Uuid,
    pub title: String,
    pub session_type: String,
    pub updated_at: DateTime<Utc>,
    pub unread_count: i64,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}
