use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    #[serde(skip_serializing)]
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    pub id: Uuid,
    pub roadmap_id: Uuid,
    pub name: String,
    #[serde(rename = "order")]
    pub step_order: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapWithSteps {
    #[serde(flatten)]
    pub roadmap: Roadmap,
    pub steps: Vec<RoadmapStep>,
}
