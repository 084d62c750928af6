use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::progress::{
    ProgressSummary, TopicProgressMap, TopicStatus, TopicUpdate, UserProgress,
};
use crate::utils::time::now;

#[derive(Clone)]
pub struct ProgressService {
    pool: PgPool,
}

impl ProgressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<ProgressSummary> {
        let progress = sqlx::query_as::<_, UserProgress>(
            r#"
            SELECT user_id, topic_progress, total_topics, completed_topics, viewed_topics, last_activity
            FROM user_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match progress {
            Some(p) => ProgressSummary::from_map(p.topic_progress.0, Some(p.last_activity)),
            None => ProgressSummary::from_map(TopicProgressMap::new(), None),
        })
    }

    pub async fn topic(&self, user_id: Uuid, topic: &str) -> Result<TopicStatus> {
        let summary = self.summary(user_id).await?;
        Ok(summary.topic_progress.get(topic).cloned().unwrap_or_default())
    }

    /// Merges `update` into the topic's status under a row lock.
    pub async fn update(&self, user_id: Uuid, topic: &str, update: &TopicUpdate) -> Result<ProgressSummary> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<Json<TopicProgressMap>> = sqlx::query_scalar(
            "SELECT topic_progress FROM user_progress WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let stamp = now();
        let mut map = stored.map(|json| json.0).unwrap_or_default();
        map.entry(topic.to_string()).or_default().apply(update, stamp);
        let summary = ProgressSummary::from_map(map, Some(stamp));

        sqlx::query(
            r#"
            INSERT INTO user_progress (
                user_id, topic_progress, total_topics, completed_topics, viewed_topics, last_activity
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                topic_progress = EXCLUDED.topic_progress,
                total_topics = EXCLUDED.total_topics,
                completed_topics = EXCLUDED.completed_topics,
                viewed_topics = EXCLUDED.viewed_topics,
                last_activity = EXCLUDED.last_activity
            "#,
        )
        .bind(user_id)
        .bind(Json(&summary.topic_progress))
        .bind(summary.total_topics)
        .bind(summary.completed_topics)
        .bind(summary.viewed_topics)
        .bind(stamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(%user_id, topic, "progress updated");
        Ok(summary)
    }
}
