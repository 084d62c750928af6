use serde::Serialize;
use uuid::Uuid;

use crate::models::mentor::{Mentor, MentorProfile, MentorStudent};
use crate::models::roadmap::RoadmapWithSteps;

#[derive(Debug, Clone, Serialize)]
pub struct MentorListResponse {
    pub mentors: Vec<MentorProfile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorDashboardResponse {
    pub mentor: Mentor,
    pub students_count: i64,
    pub active_sessions: i64,
    pub messages_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentorStudentsResponse {
    pub students: Vec<MentorStudent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRoadmapsResponse {
    pub roadmaps: Vec<RoadmapWithSteps>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub session_id: Uuid,
    pub created: bool,
}
