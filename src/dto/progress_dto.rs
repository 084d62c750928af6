use serde::Deserialize;
use validator::Validate;

use crate::models::progress::TopicUpdate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    pub viewed: Option<bool>,
    pub completed: Option<bool>,
    #[validate(range(min = 0, max = 100))]
    pub quiz_score: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub code_score: Option<i32>,
}

impl ProgressPayload {
    pub fn update(&self) -> TopicUpdate {
        TopicUpdate {
            viewed: self.viewed,
            completed: self.completed,
            quiz_score: self.quiz_score,
            code_score: self.code_score,
        }
    }
}
