use chrono::Duration;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::dto::content_dto::RECOMMENDED_TOPICS;
use crate::error::Result;
use crate::models::content::{ContentSource, Generated, RecommendedTopic};
use crate::models::user::OnboardingData;
use crate::services::content_service::ContentService;
use crate::utils::time::now;

pub const RECOMMENDATION_TTL_DAYS: i64 = 1;

#[derive(sqlx::FromRow)]
struct CachedTopics {
    content: Json<Vec<RecommendedTopic>>,
    source: String,
}

/// Per-user topic suggestions, cached for a day.
#[derive(Clone)]
pub struct RecommendationService {
    pool: PgPool,
    content: ContentService,
}

impl RecommendationService {
    pub fn new(pool: PgPool, content: ContentService) -> Self {
        Self { pool, content }
    }

    pub async fn recommended_topics(
        &self,
        user_id: Uuid,
        profile: &OnboardingData,
    ) -> Result<Generated<Vec<RecommendedTopic>>> {
        let cutoff = now() - Duration::days(RECOMMENDATION_TTL_DAYS);
        let cached = sqlx::query_as::<_, CachedTopics>(
            r#"
            SELECT content, source
            FROM personalized_content
            WHERE user_id = $1 AND content_type = $2 AND created_at > $3 AND source = 'generated'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(RECOMMENDED_TOPICS)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(cached) = cached.filter(|c| !c.content.is_empty()) {
            tracing::debug!(%user_id, "serving cached recommendations");
            return Ok(Generated {
                content: cached.content.0,
                source: ContentSource::from_stored(&cached.source),
            });
        }

        let generated = self.content.recommended_topics(profile).await?;
        if !generated.source.is_reusable() {
            return Ok(generated);
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM personalized_content WHERE user_id = $1 AND content_type = $2")
            .bind(user_id)
            .bind(RECOMMENDED_TOPICS)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO personalized_content (user_id, content_type, content, source)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(RECOMMENDED_TOPICS)
        .bind(Json(&generated.content))
        .bind(generated.source.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(generated)
    }
}
