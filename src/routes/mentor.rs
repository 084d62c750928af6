use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::mentor_dto::{MentorListResponse, MentorStudentsResponse, StudentRoadmapsResponse},
    error::Result,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/mentors",
    responses(
        (status = 200, description = "Public mentor directory", body = Json<MentorListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_mentors(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let mentors = state.mentors.list().await?;
    Ok(Json(MentorListResponse { mentors }))
}

#[utoipa::path(
    post,
    path = "/api/mentors/{id}/connect",
    params(
        ("id" = Uuid, Path, description = "Mentor ID")
    ),
    responses(
        (status = 200, description = "Chat session with the mentor", body = Json<ConnectResponse>),
        (status = 404, description = "Mentor not found")
    )
)]
#[axum::debug_handler]
pub async fn connect(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let connection = state.mentors.connect(claims.sub, id).await?;
    Ok(Json(connection))
}

#[utoipa::path(
    get,
    path = "/api/mentor/dashboard",
    responses(
        (status = 200, description = "Mentor profile with live counts", body = Json<MentorDashboardResponse>),
        (status = 403, description = "Caller is not a mentor")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let dashboard = state.mentors.dashboard(claims.sub).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/mentor/students",
    responses(
        (status = 200, description = "Students with a session assigned to the mentor", body = Json<MentorStudentsResponse>),
        (status = 403, description = "Caller is not a mentor")
    )
)]
#[axum::debug_handler]
pub async fn students(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let students = state.mentors.students(claims.sub).await?;
    Ok(Json(MentorStudentsResponse { students }))
}

#[utoipa::path(
    get,
    path = "/api/mentor/students/{student_id}/roadmaps",
    params(
        ("student_id" = Uuid, Path, description = "Student user ID")
    ),
    responses(
        (status = 200, description = "Roadmaps of the student", body = Json<StudentRoadmapsResponse>),
        (status = 404, description = "Student not found")
    )
)]
#[axum::debug_handler]
pub async fn student_roadmaps(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.mentors.ensure_student(claims.sub, student_id).await?;
    let roadmaps = state.roadmap.list_for_user(student_id).await?;
    Ok(Json(StudentRoadmapsResponse { roadmaps }))
}
