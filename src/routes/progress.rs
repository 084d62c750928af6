use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::{content_dto::require_topic, progress_dto::ProgressPayload},
    error::Result,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/web/progress",
    responses(
        (status = 200, description = "Progress across all topics", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let summary = state.progress.summary(claims.sub).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/web/progress",
    request_body = ProgressPayload,
    responses(
        (status = 200, description = "Updated progress", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProgressPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let topic = require_topic(&payload.topic)?;
    let summary = state
        .progress
        .update(claims.sub, topic, &payload.update())
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/web/progress/{topic}",
    params(
        ("topic" = String, Path, description = "Topic name")
    ),
    responses(
        (status = 200, description = "Status of one topic", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn get_topic_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(topic): Path<String>,
) -> Result<impl IntoResponse> {
    let status = state.progress.topic(claims.sub, &topic).await?;
    Ok(Json(json!({ "topic": topic, "progress": status })))
}
