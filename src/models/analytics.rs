use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::time::is_earlier_day;

pub const ACTIVITY_TOPIC_VIEW: &str = "topic-view";
pub const ACTIVITY_TOPIC_COMPLETION: &str = "topic-completion";
pub const ACTIVITY_EXERCISE_ATTEMPT: &str = "exercise-attempt";
pub const ACTIVITY_EXERCISE_COMPLETION: &str = "exercise-completion";
pub const ACTIVITY_TOPIC_RATING: &str = "topic-rating";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub user_id: Uuid,
    pub topics_viewed: i32,
    pub topics_completed: i32,
    pub total_learning_time: i32,
    pub streak_days: i32,
    pub last_activity_date: DateTime<Utc>,
    pub exercises_completed: i32,
    pub exercises_attempted: i32,
    pub average_quiz_score: f64,
    pub average_code_score: f64,
    pub last_topic_accessed: String,
    pub topic_completion_rate: f64,
}

impl Analytics {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            topics_viewed: 0,
            topics_completed: 0,
            total_learning_time: 0,
            streak_days: 0,
            last_activity_date: now,
            exercises_completed: 0,
            exercises_attempted: 0,
            average_quiz_score: 0.0,
            average_code_score: 0.0,
            last_topic_accessed: String::new(),
            topic_completion_rate: 0.0,
        }
    }

    /// The first active day starts the streak; each later calendar day extends it.
    fn touch(&mut self, topic: &str, minutes: i32, now: DateTime<Utc>) {
        if self.streak_days == 0 {
            self.streak_days = 1;
        } else if is_earlier_day(self.last_activity_date, now) {
            self.streak_days += 1;
        }
        self.last_activity_date = now;
        self.last_topic_accessed = topic.to_string();
        self.total_learning_time += minutes.max(0);
    }

    fn refresh_completion_rate(&mut self) {
        self.topic_completion_rate = if self.topics_viewed > 0 {
            (f64::from(self.topics_completed) / f64::from(self.topics_viewed) * 100.0).min(100.0)
        } else {
            0.0
        };
    }

    pub fn record_view(&mut self, topic: &str, minutes: i32, now: DateTime<Utc>) {
        self.touch(topic, minutes, now);
        self.topics_viewed += 1;
        self.refresh_completion_rate();
    }

    /// Scores are folded into running averages over completed topics.
    pub fn record_completion(
        &mut self,
        topic: &str,
        minutes: i32,
        quiz_score: Option<f64>,
        code_score: Option<f64>,
        now: DateTime<Utc>,
    ) {
        self.touch(topic, minutes, now);
        self.topics_completed += 1;
        self.topics_viewed = self.topics_viewed.max(self.topics_completed);

        let n = f64::from(self.topics_completed);
        if let Some(score) = quiz_score {
            self.average_quiz_score = (self.average_quiz_score * (n - 1.0) + score) / n;
        }
        if let Some(score) = code_score {
            self.average_code_score = if self.average_code_score == 0.0 {
                score
            } else {
                (self.average_code_score * (n - 1.0) + score) / n
            };
        }
        self.refresh_completion_rate();
    }

    /// Ratings keep the streak alive without adding learning time.
    pub fn record_rating(&mut self, topic: &str, now: DateTime<Utc>) {
        self.touch(topic, 0, now);
    }

    pub fn record_exercise(&mut self, topic: &str, minutes: i32, completed: bool, now: DateTime<Utc>) {
        self.touch(topic, minutes, now);
        self.exercises_attempted += 1;
        if completed {
            self.exercises_completed += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopicInteraction {
    pub user_id: Uuid,
    pub topic_name: String,
    pub view_count: i32,
    pub time_spent: i32,
    pub last_viewed: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub difficulty: Option<i32>,
    pub quiz_score: Option<f64>,
    pub code_score: Option<f64>,
}

impl TopicInteraction {
    pub fn new(user_id: Uuid, topic_name: &str) -> Self {
        Self {
            user_id,
            topic_name: topic_name.to_string(),
            view_count: 0,
            time_spent: 0,
            last_viewed: None,
            completed_at: None,
            rating: None,
            difficulty: None,
            quiz_score: None,
            code_score: None,
        }
    }

    pub fn record_view(&mut self, minutes: i32, now: DateTime<Utc>) {
        self.view_count += 1;
        self.time_spent += minutes.max(0);
        self.last_viewed = Some(now);
    }

    pub fn record_completion(
        &mut self,
        minutes: i32,
        quiz_score: Option<f64>,
        code_score: Option<f64>,
        now: DateTime<Utc>,
    ) {
        self.view_count = self.view_count.max(1);
        self.time_spent += minutes.max(0);
        self.last_viewed.get_or_insert(now);
        self.completed_at = Some(now);
        if quiz_score.is_some() {
            self.quiz_score = quiz_score;
        }
        if code_score.is_some() {
            self.code_score = code_score;
        }
    }

    pub fn rate(&mut self, rating: i32, difficulty: Option<i32>) {
        self.rating = Some(rating);
        if difficulty.is_some() {
            self.difficulty = difficulty;
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub description: String,
    pub topic_name: String,
    pub exercise_id: Option<String>,
    pub time_spent: i32,
    pub score: Option<f64>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub user_id: Uuid,
    #[serde(rename = "date")]
    pub activity_date: NaiveDate,
    pub learning_time_min: i32,
    pub topics_viewed: i32,
    pub topics_completed: i32,
    pub exercises_done: i32,
}

impl DailyActivity {
    pub fn empty(user_id: Uuid, activity_date: NaiveDate) -> Self {
        Self {
            user_id,
            activity_date,
            learning_time_min: 0,
            topics_viewed: 0,
            topics_completed: 0,
            exercises_done: 0,
        }
    }
}

/// One row per day in `days`, using stored rows where present and zeros elsewhere.
pub fn fill_daily(user_id: Uuid, stored: Vec<DailyActivity>, days: &[NaiveDate]) -> Vec<DailyActivity> {
    days.iter()
        .map(|day| {
            stored
                .iter()
                .find(|row| row.activity_date == *day)
                .cloned()
                .unwrap_or_else(|| DailyActivity::empty(user_id, *day))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub analytics: Analytics,
    pub daily_activity: Vec<DailyActivity>,
    pub top_interactions: Vec<TopicInteraction>,
    pub recent_activities: Vec<ActivityLog>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAnalytics {
    pub total_users: i64,
    pub active_users_today: i64,
    pub active_users_this_week: i64,
    pub total_topics_viewed: i64,
    pub total_topics_completed: i64,
    pub average_completion_rate: f64,
    pub most_popular_topics: Vec<String>,
    pub average_time_per_session: i64,
}
