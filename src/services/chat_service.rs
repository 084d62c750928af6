use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::dto::chat_dto::{ChatPayload, ChatReplyResponse, ChatSessionSummary};
use crate::error::{Error, Result};
use crate::models::chat::{
    ChatMessage, ChatSession, ChatSessionOverview, DEFAULT_SESSION_TITLE, SENDER_AI, SENDER_USER,
    SESSION_AI,
};
use crate::models::user::OnboardingData;
use crate::services::completion_service::CompletionClient;
use crate::services::content::prompts;

/// Messages of context sent along with each prompt.
pub const HISTORY_WINDOW: i64 = 10;
pub const TITLE_MAX_WORDS: usize = 5;

const SESSION_COLUMNS: &str =
    "id, user_id, mentor_id, session_type, title, is_active, last_access, created_at, updated_at";
const MESSAGE_COLUMNS: &str =
    "id, session_id, content, sender_id, sender_type, status, is_read, created_at";

#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
    completion: CompletionClient,
}

impl ChatService {
    pub fn new(pool: PgPool, completion: CompletionClient) -> Self {
        Self { pool, completion }
    }

    pub async fn send(&self, user_id: Uuid, payload: ChatPayload) -> Result<ChatReplyResponse> {
        let message = payload.message.trim();
        if message.is_empty() {
            return Err(Error::BadRequest("Message is required".to_string()));
        }

        let (mut session, is_new) = match payload.session_id {
            Some(id) => (self.owned_session(user_id, id).await?, false),
            None => (self.create_session(user_id).await?, true),
        };

        let history = self.recent_messages(session.id).await?;
        self.insert_message(session.id, message, Some(user_id), SENDER_USER, true)
            .await?;

        let profile = self.profile(user_id).await?;
        let prompt = prompts::chat(&profile, &history, message);
        let reply = self.completion.complete(&prompt).await.map_err(|err| {
            tracing::warn!(session_id = %session.id, reason = %err, "chat completion failed");
            Error::Generation(err)
        })?;
        let reply_text = reply.text.trim().to_string();

        let ai_message = self
            .insert_message(session.id, &reply_text, None, SENDER_AI, false)
            .await?;

        if is_new {
            session.title = self.generate_title(message).await;
        }
        sqlx::query(
            r#"
            UPDATE chat_sessions
            SET title = $2, last_access = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(&session.title)
        .execute(&self.pool)
        .await?;

        Ok(ChatReplyResponse {
            response: reply_text,
            session_id: session.id,
            title: session.title,
            message: ai_message,
        })
    }

    /// A failed title request keeps the default title.
    async fn generate_title(&self, first_message: &str) -> String {
        match self.completion.complete(&prompts::chat_title(first_message)).await {
            Ok(raw) => clean_title(&raw.text).unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
            Err(err) => {
                tracing::warn!(reason = %err, "chat title generation failed");
                DEFAULT_SESSION_TITLE.to_string()
            }
        }
    }

    async fn profile(&self, user_id: Uuid) -> Result<OnboardingData> {
        let data: Option<Json<OnboardingData>> =
            sqlx::query_scalar("SELECT onboarding_data FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(data.map(|json| json.0).unwrap_or_default())
    }

    async fn owned_session(&self, user_id: Uuid, session_id: Uuid) -> Result<ChatSession> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {} FROM chat_sessions WHERE id = $1 AND user_id = $2",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Chat session not found".to_string()))
    }

    async fn create_session(&self, user_id: Uuid) -> Result<ChatSession> {
        let session = sqlx::query_as::<_, ChatSession>(&format!(
            r#"
            INSERT INTO chat_sessions (user_id, session_type, title)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(SESSION_AI)
        .bind(DEFAULT_SESSION_TITLE)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(%user_id, session_id = %session.id, "chat session created");
        Ok(session)
    }

    async fn recent_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {}
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(session_id)
        .bind(HISTORY_WINDOW)
        .fetch_all(&self.pool)
        .await?;
        messages.reverse();
        Ok(messages)
    }

    async fn insert_message(
        &self,
        session_id: Uuid,
        content: &str,
        sender_id: Option<Uuid>,
        sender_type: &str,
        is_read: bool,
    ) -> Result<ChatMessage> {
        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (session_id, content, sender_id, sender_type, is_read)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(session_id)
        .bind(content)
        .bind(sender_id)
        .bind(sender_type)
        .bind(is_read)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    pub async fn sessions(&self, user_id: Uuid) -> Result<Vec<ChatSessionSummary>> {
        let rows = sqlx::query_as::<_, ChatSessionOverview>(
            r#"
            SELECT
                s.id,
                s.title,
                s.session_type,
                s.updated_at,
                (
                    SELECT COUNT(*)
                    FROM chat_messages m
                    WHERE m.session_id = s.id AND m.sender_type <> $2 AND NOT m.is_read
                ) AS unread_count,
                last.content AS last_message,
                last.created_at AS last_message_at
            FROM chat_sessions s
            LEFT JOIN LATERAL (
                SELECT content, created_at
                FROM chat_messages
                WHERE session_id = s.id
                ORDER BY created_at DESC
                LIMIT 1
            ) last ON TRUE
            WHERE s.user_id = $1
            ORDER BY s.updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(SENDER_USER)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChatSessionSummary::from).collect())
    }

    /// Loads a session with its messages and marks replies as read.
    pub async fn history(&self, user_id: Uuid, session_id: Uuid) -> Result<(ChatSession, Vec<ChatMessage>)> {
        let session = self.owned_session(user_id, session_id).await?;

        sqlx::query(
            "UPDATE chat_messages SET is_read = TRUE WHERE session_id = $1 AND sender_type <> $2 AND NOT is_read",
        )
        .bind(session_id)
        .bind(SENDER_USER)
        .execute(&self.pool)
        .await?;
        sqlx::query("UPDATE chat_sessions SET last_access = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {} FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
            MESSAGE_COLUMNS
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((session, messages))
    }

    /// Removes every session and message of the user; returns the session count.
    pub async fn delete_all(&self, user_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM chat_messages WHERE session_id IN (SELECT id FROM chat_sessions WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        let deleted = sqlx::query("DELETE FROM chat_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        tracing::info!(%user_id, deleted, "chat history cleared");
        Ok(deleted)
    }
}

/// First line of the reply, unquoted and cut to five words.
pub fn clean_title(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line
        .trim_start_matches(|c| c == '"' || c == '\'' || c == '#' || c == '*')
        .trim_end_matches(|c| c == '"' || c == '\'' || c == '*' || c == '.');
    let title = line
        .split_whitespace()
        .take(TITLE_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_cut_to_five_words() {
        assert_eq!(
            clean_title("\"Learning Rust Ownership And Borrowing Rules\"\n").as_deref(),
            Some("Learning Rust Ownership And Borrowing")
        );
    }

    #[test]
    fn title_takes_first_non_blank_line() {
        assert_eq!(
            clean_title("\n  **Async basics.**\nsomething else").as_deref(),
            Some("Async basics")
        );
    }

    #[test]
    fn empty_title_is_none() {
        assert_eq!(clean_title("  \n \"\" "), None);
    }
}
