use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub rating: f64,
    pub reviews: i32,
    pub hourly_rate: Decimal,
    pub available: bool,
    pub bio: String,
    pub social_links: Json<SocialLinks>,
    pub specializations: Vec<String>,
    pub languages: Vec<String>,
    pub timezone: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Row shape for the public mentor directory.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub specializations: Vec<String>,
    pub languages: Vec<String>,
    pub experience: String,
    pub hourly_rate: Decimal,
    pub rating: f64,
    pub avatar_url: String,
    pub social_links: Json<SocialLinks>,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MentorStudent {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub joined_date: DateTime<Utc>,
    pub sessions_count: i64,
    pub last_session: Option<DateTime<Utc>>,
}
