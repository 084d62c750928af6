use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::analytics_dto::{
    ExerciseActivityPayload, RateTopicPayload, TopicCompletionPayload, TopicViewPayload,
};
use crate::error::Result;
use crate::models::analytics::{
    fill_daily, ActivityLog, Analytics, AnalyticsResponse, DailyActivity, GlobalAnalytics,
    TopicInteraction, ACTIVITY_EXERCISE_ATTEMPT, ACTIVITY_EXERCISE_COMPLETION,
    ACTIVITY_TOPIC_COMPLETION, ACTIVITY_TOPIC_RATING, ACTIVITY_TOPIC_VIEW,
};
use crate::utils::time::{now, today, trailing_days};

pub const DAILY_WINDOW_DAYS: u32 = 31;
pub const TOP_INTERACTIONS: i64 = 10;
pub const RECENT_ACTIVITIES: i64 = 15;
pub const POPULAR_TOPICS: i64 = 5;

const ANALYTICS_COLUMNS: &str = r#"
    user_id, topics_viewed, topics_completed, total_learning_time, streak_days,
    last_activity_date, exercises_completed, exercises_attempted, average_quiz_score,
    average_code_score, last_topic_accessed, topic_completion_rate
"#;
const INTERACTION_COLUMNS: &str = r#"
    user_id, topic_name, view_count, time_spent, last_viewed, completed_at,
    rating, difficulty, quiz_score, code_score
"#;

struct NewActivity<'a> {
    kind: &'static str,
    description: String,
    topic: &'a str,
    exercise_id: Option<&'a str>,
    time_spent: i32,
    score: Option<f64>,
}

/// Increments applied to today's daily activity row.
#[derive(Default)]
struct DailyDelta {
    minutes: i32,
    viewed: i32,
    completed: i32,
    exercises: i32,
}

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self, user_id: Uuid) -> Result<AnalyticsResponse> {
        sqlx::query("INSERT INTO analytics (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let analytics = sqlx::query_as::<_, Analytics>(&format!(
            "SELECT {} FROM analytics WHERE user_id = $1",
            ANALYTICS_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let days = trailing_days(today(), DAILY_WINDOW_DAYS);
        let stored = match days.first() {
            Some(first) => {
                sqlx::query_as::<_, DailyActivity>(
                    r#"
                    SELECT user_id, activity_date, learning_time_min, topics_viewed,
                           topics_completed, exercises_done
                    FROM daily_activity
                    WHERE user_id = $1 AND activity_date >= $2
                    ORDER BY activity_date ASC
                    "#,
                )
                .bind(user_id)
                .bind(*first)
                .fetch_all(&self.pool)
                .await?
            }
            None => Vec::new(),
        };

        let top_interactions = sqlx::query_as::<_, TopicInteraction>(&format!(
            r#"
            SELECT {}
            FROM topic_interactions
            WHERE user_id = $1
            ORDER BY view_count DESC, topic_name ASC
            LIMIT $2
            "#,
            INTERACTION_COLUMNS
        ))
        .bind(user_id)
        .bind(TOP_INTERACTIONS)
        .fetch_all(&self.pool)
        .await?;

        let recent_activities = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, user_id, activity_type, description, topic_name, exercise_id,
                   time_spent, score, created_at
            FROM activity_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_ACTIVITIES)
        .fetch_all(&self.pool)
        .await?;

        Ok(AnalyticsResponse {
            analytics,
            daily_activity: fill_daily(user_id, stored, &days),
            top_interactions,
            recent_activities,
        })
    }

    pub async fn track_view(&self, user_id: Uuid, payload: &TopicViewPayload) -> Result<Analytics> {
        let stamp = now();
        let topic = payload.topic.trim();
        let mut tx = self.pool.begin().await?;

        let mut analytics = load_analytics(&mut tx, user_id, stamp).await?;
        analytics.record_view(topic, payload.time_spent, stamp);
        save_analytics(&mut tx, &analytics).await?;

        let mut interaction = load_interaction(&mut tx, user_id, topic).await?;
        interaction.record_view(payload.time_spent, stamp);
        save_interaction(&mut tx, &interaction).await?;

        log_activity(
            &mut tx,
            user_id,
            NewActivity {
                kind: ACTIVITY_TOPIC_VIEW,
                description: format!("Viewed topic: {}", topic),
                topic,
                exercise_id: None,
                time_spent: payload.time_spent,
                score: None,
            },
        )
        .await?;
        bump_daily(
            &mut tx,
            user_id,
            stamp,
            DailyDelta {
                minutes: payload.time_spent,
                viewed: 1,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(analytics)
    }

    pub async fn track_completion(
        &self,
        user_id: Uuid,
        payload: &TopicCompletionPayload,
    ) -> Result<Analytics> {
        let stamp = now();
        let topic = payload.topic.trim();
        let minutes = payload.time_to_complete;
        let mut tx = self.pool.begin().await?;

        let mut analytics = load_analytics(&mut tx, user_id, stamp).await?;
        analytics.record_completion(topic, minutes, payload.quiz_score, payload.code_score, stamp);
        save_analytics(&mut tx, &analytics).await?;

        let mut interaction = load_interaction(&mut tx, user_id, topic).await?;
        interaction.record_completion(minutes, payload.quiz_score, payload.code_score, stamp);
        save_interaction(&mut tx, &interaction).await?;

        log_activity(
            &mut tx,
            user_id,
            NewActivity {
                kind: ACTIVITY_TOPIC_COMPLETION,
                description: format!("Completed topic: {}", topic),
                topic,
                exercise_id: None,
                time_spent: minutes,
                score: payload.quiz_score.or(payload.code_score),
            },
        )
        .await?;
        bump_daily(
            &mut tx,
            user_id,
            stamp,
            DailyDelta {
                minutes,
                completed: 1,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(%user_id, topic, "topic completed");
        Ok(analytics)
    }

    pub async fn track_exercise(
        &self,
        user_id: Uuid,
        payload: &ExerciseActivityPayload,
    ) -> Result<Analytics> {
        let stamp = now();
        let topic = payload.topic.trim();
        let mut tx = self.pool.begin().await?;

        let mut analytics = load_analytics(&mut tx, user_id, stamp).await?;
        analytics.record_exercise(topic, payload.time_spent, payload.completed, stamp);
        save_analytics(&mut tx, &analytics).await?;

        let mut interaction = load_interaction(&mut tx, user_id, topic).await?;
        interaction.time_spent += payload.time_spent.max(0);
        save_interaction(&mut tx, &interaction).await?;

        let (kind, verb) = if payload.completed {
            (ACTIVITY_EXERCISE_COMPLETION, "Completed")
        } else {
            (ACTIVITY_EXERCISE_ATTEMPT, "Attempted")
        };
        log_activity(
            &mut tx,
            user_id,
            NewActivity {
                kind,
                description: format!("{} exercise {} in {}", verb, payload.exercise_id, topic),
                topic,
                exercise_id: Some(&payload.exercise_id),
                time_spent: payload.time_spent,
                score: payload.score,
            },
        )
        .await?;
        bump_daily(
            &mut tx,
            user_id,
            stamp,
            DailyDelta {
                minutes: payload.time_spent,
                exercises: i32::from(payload.completed),
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(analytics)
    }

    pub async fn rate_topic(&self, user_id: Uuid, payload: &RateTopicPayload) -> Result<TopicInteraction> {
        let stamp = now();
        let topic = payload.topic.trim();
        let mut tx = self.pool.begin().await?;

        let mut analytics = load_analytics(&mut tx, user_id, stamp).await?;
        analytics.record_rating(topic, stamp);
        save_analytics(&mut tx, &analytics).await?;

        let mut interaction = load_interaction(&mut tx, user_id, topic).await?;
        interaction.rate(payload.rating, payload.difficulty);
        save_interaction(&mut tx, &interaction).await?;

        log_activity(
            &mut tx,
            user_id,
            NewActivity {
                kind: ACTIVITY_TOPIC_RATING,
                description: format!("Rated topic {} with {} stars", topic, payload.rating),
                topic,
                exercise_id: None,
                time_spent: 0,
                score: Some(f64::from(payload.rating)),
            },
        )
        .await?;
        bump_daily(&mut tx, user_id, stamp, DailyDelta::default()).await?;

        tx.commit().await?;
        Ok(interaction)
    }

    pub async fn global(&self) -> Result<GlobalAnalytics> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let active_users_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM activity_logs WHERE created_at >= date_trunc('day', NOW())",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_users_this_week: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM activity_logs WHERE created_at >= NOW() - INTERVAL '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        let (total_topics_viewed, total_topics_completed, average_completion_rate): (i64, i64, f64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(topics_viewed), 0)::BIGINT,
                    COALESCE(SUM(topics_completed), 0)::BIGINT,
                    COALESCE(AVG(topic_completion_rate), 0)::FLOAT8
                FROM analytics
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let most_popular_topics: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT topic_name
            FROM topic_interactions
            GROUP BY topic_name
            ORDER BY SUM(view_count) DESC, topic_name ASC
            LIMIT $1
            "#,
        )
        .bind(POPULAR_TOPICS)
        .fetch_all(&self.pool)
        .await?;

        let average_time_per_session: i64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG(time_spent), 0)::BIGINT FROM activity_logs",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(GlobalAnalytics {
            total_users,
            active_users_today,
            active_users_this_week,
            total_topics_viewed,
            total_topics_completed,
            average_completion_rate,
            most_popular_topics,
            average_time_per_session,
        })
    }
}

async fn load_analytics(conn: &mut PgConnection, user_id: Uuid, now: DateTime<Utc>) -> Result<Analytics> {
    let row = sqlx::query_as::<_, Analytics>(&format!(
        "SELECT {} FROM analytics WHERE user_id = $1 FOR UPDATE",
        ANALYTICS_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.unwrap_or_else(|| Analytics::new(user_id, now)))
}

async fn save_analytics(conn: &mut PgConnection, a: &Analytics) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analytics (
            user_id, topics_viewed, topics_completed, total_learning_time, streak_days,
            last_activity_date, exercises_completed, exercises_attempted, average_quiz_score,
            average_code_score, last_topic_accessed, topic_completion_rate
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (user_id) DO UPDATE SET
            topics_viewed = EXCLUDED.topics_viewed,
            topics_completed = EXCLUDED.topics_completed,
            total_learning_time = EXCLUDED.total_learning_time,
            streak_days = EXCLUDED.streak_days,
            last_activity_date = EXCLUDED.last_activity_date,
            exercises_completed = EXCLUDED.exercises_completed,
            exercises_attempted = EXCLUDED.exercises_attempted,
            average_quiz_score = EXCLUDED.average_quiz_score,
            average_code_score = EXCLUDED.average_code_score,
            last_topic_accessed = EXCLUDED.last_topic_accessed,
            topic_completion_rate = EXCLUDED.topic_completion_rate
        "#,
    )
    .bind(a.user_id)
    .bind(a.topics_viewed)
    .bind(a.topics_completed)
    .bind(a.total_learning_time)
    .bind(a.streak_days)
    .bind(a.last_activity_date)
    .bind(a.exercises_completed)
    .bind(a.exercises_attempted)
    .bind(a.average_quiz_score)
    .bind(a.average_code_score)
    .bind(&a.last_topic_accessed)
    .bind(a.topic_completion_rate)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn load_interaction(conn: &mut PgConnection, user_id: Uuid, topic: &str) -> Result<TopicInteraction> {
    let row = sqlx::query_as::<_, TopicInteraction>(&format!(
        "SELECT {} FROM topic_interactions WHERE user_id = $1 AND topic_name = $2 FOR UPDATE",
        INTERACTION_COLUMNS
    ))
    .bind(user_id)
    .bind(topic)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.unwrap_or_else(|| TopicInteraction::new(user_id, topic)))
}

async fn save_interaction(conn: &mut PgConnection, t: &TopicInteraction) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO topic_interactions (
            user_id, topic_name, view_count, time_spent, last_viewed, completed_at,
            rating, difficulty, quiz_score, code_score
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, topic_name) DO UPDATE SET
            view_count = EXCLUDED.view_count,
            time_spent = EXCLUDED.time_spent,
            last_viewed = EXCLUDED.last_viewed,
            completed_at = EXCLUDED.completed_at,
            rating = EXCLUDED.rating,
            difficulty = EXCLUDED.difficulty,
            quiz_score = EXCLUDED.quiz_score,
            code_score = EXCLUDED.code_score
        "#,
    )
    .bind(t.user_id)
    .bind(&t.topic_name)
    .bind(t.view_count)
    .bind(t.time_spent)
    .bind(t.last_viewed)
    .bind(t.completed_at)
    .bind(t.rating)
    .bind(t.difficulty)
    .bind(t.quiz_score)
    .bind(t.code_score)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn log_activity(conn: &mut PgConnection, user_id: Uuid, activity: NewActivity<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (
            user_id, activity_type, description, topic_name, exercise_id, time_spent, score
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user_id)
    .bind(activity.kind)
    .bind(activity.description)
    .bind(activity.topic)
    .bind(activity.exercise_id)
    .bind(activity.time_spent.max(0))
    .bind(activity.score)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn bump_daily(conn: &mut PgConnection, user_id: Uuid, now: DateTime<Utc>, delta: DailyDelta) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_activity (
            user_id, activity_date, learning_time_min, topics_viewed, topics_completed, exercises_done
        ) VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, activity_date) DO UPDATE SET
            learning_time_min = daily_activity.learning_time_min + EXCLUDED.learning_time_min,
            topics_viewed = daily_activity.topics_viewed + EXCLUDED.topics_viewed,
            topics_completed = daily_activity.topics_completed + EXCLUDED.topics_completed,
            exercises_done = daily_activity.exercises_done + EXCLUDED.exercises_done
        "#,
    )
    .bind(user_id)
    .bind(now.date_naive())
    .bind(delta.minutes.max(0))
    .bind(delta.viewed)
    .bind(delta.completed)
    .bind(delta.exercises)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
