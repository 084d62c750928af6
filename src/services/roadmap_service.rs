use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::content::{ContentSource, Generated};
use crate::models::roadmap::{Roadmap, RoadmapStep, RoadmapWithSteps};
use crate::services::content_service::ContentService;
use crate::utils::time::now;

/// Stored roadmaps younger than this are served without regenerating.
pub const ROADMAP_REUSE_DAYS: i64 = 7;

#[derive(Clone)]
pub struct RoadmapService {
    pool: PgPool,
    content: ContentService,
}

impl RoadmapService {
    pub fn new(pool: PgPool, content: ContentService) -> Self {
        Self { pool, content }
    }

    pub async fn roadmap_for(&self, user_id: Uuid, topic: &str) -> Result<Generated<Vec<String>>> {
        if let Some(stored) = self.recent(user_id, topic).await? {
            tracing::debug!(%user_id, topic, "serving stored roadmap");
            return Ok(Generated {
                source: ContentSource::Generated,
                content: stored.steps.into_iter().map(|step| step.name).collect(),
            });
        }

        let generated = self.content.roadmap(topic).await?;
        if generated.source.is_reusable() {
            self.replace(user_id, topic, &generated).await?;
        } else {
            tracing::warn!(%user_id, topic, "fallback roadmap served, not stored");
        }
        Ok(generated)
    }

    async fn recent(&self, user_id: Uuid, topic: &str) -> Result<Option<RoadmapWithSteps>> {
        let cutoff = now() - Duration::days(ROADMAP_REUSE_DAYS);
        let roadmap = sqlx::query_as::<_, Roadmap>(
            r#"
            SELECT id, user_id, topic, source, created_at
            FROM roadmaps
            WHERE user_id = $1 AND topic = $2 AND created_at > $3 AND source = 'generated'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(topic)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        match roadmap {
            Some(roadmap) => {
                let steps = self.steps(roadmap.id).await?;
                if steps.is_empty() {
                    return Ok(None);
                }
                Ok(Some(RoadmapWithSteps { roadmap, steps }))
            }
            None => Ok(None),
        }
    }

    async fn steps(&self, roadmap_id: Uuid) -> Result<Vec<RoadmapStep>> {
        let steps = sqlx::query_as::<_, RoadmapStep>(
            r#"
            SELECT id, roadmap_id, name, step_order
            FROM roadmap_steps
            WHERE roadmap_id = $1
            ORDER BY step_order ASC
            "#,
        )
        .bind(roadmap_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(steps)
    }

    /// Drops earlier roadmaps for the topic and stores `steps` in order.
    async fn replace(&self, user_id: Uuid, topic: &str, roadmap: &Generated<Vec<String>>) -> Result<Uuid> {
        let steps = &roadmap.content;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM roadmaps WHERE user_id = $1 AND topic = $2")
            .bind(user_id)
            .bind(topic)
            .execute(&mut *tx)
            .await?;

        let roadmap_id: Uuid = sqlx::query_scalar(
            "INSERT INTO roadmaps (user_id, topic, source) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(topic)
        .bind(roadmap.source.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let orders: Vec<i32> = (1..=steps.len() as i32).collect();
        sqlx::query(
            r#"
            INSERT INTO roadmap_steps (roadmap_id, name, step_order)
            SELECT $1, step.name, step.step_order
            FROM UNNEST($2::TEXT[], $3::INT4[]) AS step(name, step_order)
            "#,
        )
        .bind(roadmap_id)
        .bind(steps)
        .bind(&orders)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(%user_id, topic, steps = steps.len(), "roadmap stored");
        Ok(roadmap_id)
    }

    /// Every stored roadmap of a user, newest first, with ordered steps.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RoadmapWithSteps>> {
        let roadmaps = sqlx::query_as::<_, Roadmap>(
            r#"
            SELECT id, user_id, topic, source, created_at
            FROM roadmaps
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(roadmaps.len());
        for roadmap in roadmaps {
            let steps = self.steps(roadmap.id).await?;
            result.push(RoadmapWithSteps { roadmap, steps });
        }
        Ok(result)
    }
}
