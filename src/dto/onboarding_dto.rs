use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::OnboardingData;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPayload {
    #[validate(length(max = 10))]
    pub age: String,
    #[validate(length(min = 1, message = "Experience level is required"))]
    pub experience: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub learning_style: String,
}

impl From<OnboardingPayload> for OnboardingData {
    fn from(payload: OnboardingPayload) -> Self {
        Self {
            age: payload.age,
            experience: payload.experience,
            interests: payload.interests,
            goals: payload.goals,
            learning_style: payload.learning_style,
            completed: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatusResponse {
    pub completed: bool,
}
