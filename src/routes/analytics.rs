use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::{
        analytics_dto::{
            ExerciseActivityPayload, RateTopicPayload, TopicCompletionPayload, TopicViewPayload,
        },
        content_dto::require_topic,
    },
    error::Result,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/web/analytics",
    responses(
        (status = 200, description = "Learning analytics of the current user", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let overview = state.analytics.overview(claims.sub).await?;
    Ok(Json(overview))
}

#[utoipa::path(
    post,
    path = "/api/web/analytics/topic-view",
    request_body = TopicViewPayload,
    responses(
        (status = 200, description = "View recorded", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn track_topic_view(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TopicViewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    require_topic(&payload.topic)?;
    let analytics = state.analytics.track_view(claims.sub, &payload).await?;
    Ok(Json(json!({ "message": "Topic view tracked", "analytics": analytics })))
}

#[utoipa::path(
    post,
    path = "/api/web/analytics/topic-completion",
    request_body = TopicCompletionPayload,
    responses(
        (status = 200, description = "Completion recorded", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn track_topic_completion(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TopicCompletionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    require_topic(&payload.topic)?;
    let analytics = state.analytics.track_completion(claims.sub, &payload).await?;
    Ok(Json(json!({ "message": "Topic completion tracked", "analytics": analytics })))
}

#[utoipa::path(
    post,
    path = "/api/web/analytics/exercise-activity",
    request_body = ExerciseActivityPayload,
    responses(
        (status = 200, description = "Exercise activity recorded", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn track_exercise_activity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ExerciseActivityPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    require_topic(&payload.topic)?;
    let analytics = state.analytics.track_exercise(claims.sub, &payload).await?;
    Ok(Json(json!({ "message": "Exercise activity tracked", "analytics": analytics })))
}

#[utoipa::path(
    post,
    path = "/api/web/analytics/rate-topic",
    request_body = RateTopicPayload,
    responses(
        (status = 200, description = "Rating recorded", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn rate_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RateTopicPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    require_topic(&payload.topic)?;
    let interaction = state.analytics.rate_topic(claims.sub, &payload).await?;
    Ok(Json(json!({ "message": "Topic rated", "interaction": interaction })))
}

#[utoipa::path(
    get,
    path = "/api/web/analytics/global",
    responses(
        (status = 200, description = "Platform-wide totals", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn global_analytics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let global = state.analytics.global().await?;
    Ok(Json(global))
}
