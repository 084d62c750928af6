use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::mentor_dto::{ConnectResponse, MentorDashboardResponse};
use crate::error::{Error, Result};
use crate::models::chat::SESSION_MENTOR;
use crate::models::mentor::{Mentor, MentorProfile, MentorStudent};

const MENTOR_COLUMNS: &str = r#"
    id, user_id, name, email, skills, experience, rating, reviews, hourly_rate, available,
    bio, social_links, specializations, languages, timezone, verified, created_at
"#;

#[derive(Clone)]
pub struct MentorService {
    pool: PgPool,
}

impl MentorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<MentorProfile>> {
        let mentors = sqlx::query_as::<_, MentorProfile>(
            r#"
            SELECT
                m.id, m.user_id, m.name, m.email, m.bio, m.skills, m.specializations,
                m.languages, m.experience, m.hourly_rate, m.rating, u.avatar_url,
                m.social_links, m.available
            FROM mentors m
            JOIN users u ON u.id = m.user_id
            ORDER BY m.rating DESC, m.created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(mentors)
    }

    pub async fn by_user(&self, user_id: Uuid) -> Result<Mentor> {
        sqlx::query_as::<_, Mentor>(&format!(
            "SELECT {} FROM mentors WHERE user_id = $1",
            MENTOR_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Mentor profile not found".to_string()))
    }

    pub async fn dashboard(&self, user_id: Uuid) -> Result<MentorDashboardResponse> {
        let mentor = self.by_user(user_id).await?;

        let (students_count, active_sessions, messages_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT s.user_id),
                COUNT(DISTINCT s.id) FILTER (WHERE s.is_active),
                (
                    SELECT COUNT(*)
                    FROM chat_messages m
                    JOIN chat_sessions ms ON ms.id = m.session_id
                    WHERE ms.mentor_id = $1
                )
            FROM chat_sessions s
            WHERE s.mentor_id = $1
            "#,
        )
        .bind(mentor.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MentorDashboardResponse {
            mentor,
            students_count,
            active_sessions,
            messages_count,
        })
    }

    pub async fn students(&self, user_id: Uuid) -> Result<Vec<MentorStudent>> {
        let mentor = self.by_user(user_id).await?;
        let students = sqlx::query_as::<_, MentorStudent>(
            r#"
            SELECT
                u.id,
                COALESCE(NULLIF(u.display_name, ''), u.username) AS name,
                u.email,
                u.created_at AS joined_date,
                COUNT(s.id) AS sessions_count,
                MAX(s.last_access) AS last_session
            FROM users u
            JOIN chat_sessions s ON s.user_id = u.id
            WHERE s.mentor_id = $1
            GROUP BY u.id
            ORDER BY MAX(s.last_access) DESC
            "#,
        )
        .bind(mentor.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    /// A user counts as a student only through a session with this mentor.
    pub async fn ensure_student(&self, user_id: Uuid, student_id: Uuid) -> Result<()> {
        let mentor = self.by_user(user_id).await?;
        let linked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chat_sessions WHERE mentor_id = $1 AND user_id = $2)",
        )
        .bind(mentor.id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        if linked {
            Ok(())
        } else {
            Err(Error::NotFound("Student not found".to_string()))
        }
    }

    /// Reuses the caller's existing session with the mentor when there is one.
    pub async fn connect(&self, user_id: Uuid, mentor_id: Uuid) -> Result<ConnectResponse> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM mentors WHERE id = $1")
            .bind(mentor_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(name) = name else {
            return Err(Error::NotFound("Mentor not found".to_string()));
        };

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM chat_sessions
            WHERE user_id = $1 AND mentor_id = $2 AND session_type = $3
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(mentor_id)
        .bind(SESSION_MENTOR)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(session_id) = existing {
            sqlx::query("UPDATE chat_sessions SET is_active = TRUE, last_access = NOW() WHERE id = $1")
                .bind(session_id)
                .execute(&self.pool)
                .await?;
            return Ok(ConnectResponse {
                session_id,
                created: false,
            });
        }

        let session_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO chat_sessions (user_id, mentor_id, session_type, title)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(mentor_id)
        .bind(SESSION_MENTOR)
        .bind(format!("Chat with {}", name))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(%user_id, %mentor_id, %session_id, "mentor session opened");
        Ok(ConnectResponse {
            session_id,
            created: true,
        })
    }
}
