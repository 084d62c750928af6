use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::content::{Difficulty, Exercise, Lecture, RecommendedTopic};

pub const DEFAULT_QUIZ_COUNT: i64 = 3;
pub const DEFAULT_CODING_COUNT: i64 = 2;
pub const MAX_EXERCISE_COUNT: i64 = 5;

pub const RECOMMENDED_TOPICS: &str = "recommended-topics";

/// Blank topics pass the length check, so handlers call this after `validate`.
pub fn require_topic(topic: &str) -> Result<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(Error::BadRequest("Topic is required".to_string()));
    }
    Ok(topic)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoadmapPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LecturePayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub modular: bool,
}

impl LecturePayload {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::parse_lenient(self.difficulty.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExercisesPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    pub difficulty: Option<String>,
    pub quiz_count: Option<i64>,
    pub coding_count: Option<i64>,
}

impl ExercisesPayload {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::parse_lenient(self.difficulty.as_deref())
    }

    /// Quiz and coding counts, defaulted and clamped to `1..=5`.
    pub fn counts(&self) -> (usize, usize) {
        let clamp = |value: Option<i64>, default: i64| {
            value.unwrap_or(default).clamp(1, MAX_EXERCISE_COUNT) as usize
        };
        (
            clamp(self.quiz_count, DEFAULT_QUIZ_COUNT),
            clamp(self.coding_count, DEFAULT_CODING_COUNT),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedContentPayload {
    #[validate(length(min = 1))]
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapResponse {
    pub roadmap: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureResponse {
    pub lecture: Lecture,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExercisesResponse {
    pub exercises: Vec<Exercise>,
    pub topic: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedTopicsResponse {
    pub recommended_topics: Vec<RecommendedTopic>,
}
