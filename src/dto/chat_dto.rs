use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chat::{ChatMessage, ChatSession, ChatSessionOverview};

pub const PREVIEW_LIMIT: usize = 50;
pub const PREVIEW_KEEP: usize = 47;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyResponse {
    pub response: String,
    pub session_id: Uuid,
    pub title: String,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub updated_at: DateTime<Utc>,
    pub unread_count: i64,
    pub last_message: String,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Long previews keep their first 47 characters and gain an ellipsis.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LIMIT {
        let kept: String = text.chars().take(PREVIEW_KEEP).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

impl From<ChatSessionOverview> for ChatSessionSummary {
    fn from(row: ChatSessionOverview) -> Self {
        Self {
            id: row.id,
            title: row.title,
            session_type: row.session_type,
            updated_at: row.updated_at,
            unread_count: row.unread_count,
            last_message: row.last_message.as_deref().map(preview).unwrap_or_default(),
            last_message_at: row.last_message_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSessionsResponse {
    pub sessions: Vec<ChatSessionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatHistoryResponse {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_are_kept() {
        let text = "x".repeat(PREVIEW_LIMIT);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn long_messages_are_truncated() {
        let text = "y".repeat(PREVIEW_LIMIT + 1);
        let shown = preview(&text);
        assert_eq!(shown.chars().count(), PREVIEW_KEEP + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "ж".repeat(60);
        assert_eq!(preview(&text), format!("{}...", "ж".repeat(PREVIEW_KEEP)));
    }
}
