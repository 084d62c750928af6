use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

pub type TopicProgressMap = BTreeMap<String, TopicStatus>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicStatus {
    pub viewed: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub quiz_score: i32,
    pub code_score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_viewed: Option<DateTime<Utc>>,
}

/// Partial update coming from the client.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate {
    pub viewed: Option<bool>,
    pub completed: Option<bool>,
    pub quiz_score: Option<i32>,
    pub code_score: Option<i32>,
}

impl TopicStatus {
    /// Flags only move forward, scores keep their best value and the
    /// completion timestamp is stamped once.
    pub fn apply(&mut self, update: &TopicUpdate, now: DateTime<Utc>) {
        if update.viewed.unwrap_or(false) {
            self.viewed = true;
        }
        if update.completed.unwrap_or(false) {
            self.completed = true;
            self.viewed = true;
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        }
        if let Some(score) = update.quiz_score {
            self.quiz_score = self.quiz_score.max(score.clamp(0, 100));
        }
        if let Some(score) = update.code_score {
            self.code_score = self.code_score.max(score.clamp(0, 100));
        }
        self.last_viewed = Some(now);
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub topic_progress: Json<TopicProgressMap>,
    pub total_topics: i32,
    pub completed_topics: i32,
    pub viewed_topics: i32,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub topic_progress: TopicProgressMap,
    pub total_topics: i32,
    pub completed_topics: i32,
    pub viewed_topics: i32,
    pub completion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl ProgressSummary {
    pub fn from_map(topic_progress: TopicProgressMap, last_activity: Option<DateTime<Utc>>) -> Self {
        let total_topics = topic_progress.len() as i32;
        let completed_topics = topic_progress.values().filter(|s| s.completed).count() as i32;
        let viewed_topics = topic_progress.values().filter(|s| s.viewed).count() as i32;
        let completion_rate = if total_topics > 0 {
            f64::from(completed_topics) / f64::from(total_topics) * 100.0
        } else {
            0.0
        };

        Self {
            topic_progress,
            total_topics,
            completed_topics,
            viewed_topics,
            completion_rate,
            last_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn scores_keep_the_best_attempt() {
        let now = Utc::now();
        let mut status = TopicStatus::default();
        status.apply(
            &TopicUpdate {
                quiz_score: Some(80),
                ..Default::default()
            },
            now,
        );
        status.apply(
            &TopicUpdate {
                quiz_score: Some(40),
                code_score: Some(150),
                ..Default::default()
            },
            now,
        );
        assert_eq!(status.quiz_score, 80);
        assert_eq!(status.code_score, 100);
    }

    #[test]
    fn completion_time_is_stamped_once() {
        let first = Utc::now();
        let later = first + Duration::hours(3);
        let mut status = TopicStatus::default();
        let complete = TopicUpdate {
            completed: Some(true),
            ..Default::default()
        };

        status.apply(&complete, first);
        status.apply(&complete, later);

        assert!(status.completed && status.viewed);
        assert_eq!(status.completed_at, Some(first));
        assert_eq!(status.last_viewed, Some(later));
    }

    #[test]
    fn completed_flag_never_regresses() {
        let mut status = TopicStatus::default();
        status.apply(
            &TopicUpdate {
                completed: Some(true),
                ..Default::default()
            },
            Utc::now(),
        );
        status.apply(
            &TopicUpdate {
                completed: Some(false),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(status.completed);
    }

    #[test]
    fn summary_computes_rate() {
        let mut map = TopicProgressMap::new();
        map.insert(
            "rust".into(),
            TopicStatus {
                viewed: true,
                completed: true,
                ..Default::default()
            },
        );
        map.insert(
            "go".into(),
            TopicStatus {
                viewed: true,
                ..Default::default()
            },
        );
        map.insert("zig".into(), TopicStatus::default());
        map.insert(
            "c".into(),
            TopicStatus {
                viewed: true,
                completed: true,
                ..Default::default()
            },
        );

        let summary = ProgressSummary::from_map(map, None);
        assert_eq!(summary.total_topics, 4);
        assert_eq!(summary.completed_topics, 2);
        assert_eq!(summary.viewed_topics, 3);
        assert!((summary.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary_has_zero_rate() {
        let summary = ProgressSummary::from_map(TopicProgressMap::new(), None);
        assert_eq!(summary.completion_rate, 0.0);
    }
}
