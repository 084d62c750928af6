use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: String,
    pub onboarding_data: Json<OnboardingData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingData {
    pub age: String,
    pub experience: String,
    pub interests: Vec<String>,
    pub goals: Vec<String>,
    pub learning_style: String,
    pub completed: bool,
}

impl OnboardingData {
    /// Profile used for prompts when the caller is anonymous.
    pub fn anonymous() -> Self {
        Self {
            age: "25".to_string(),
            experience: "intermediate".to_string(),
            interests: vec![
                "programming".to_string(),
                "web development".to_string(),
                "AI".to_string(),
            ],
            goals: vec!["learn new skills".to_string(), "career growth".to_string()],
            learning_style: "visual".to_string(),
            completed: true,
        }
    }
}
