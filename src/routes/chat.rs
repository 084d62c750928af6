use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::chat_dto::{ChatHistoryResponse, ChatPayload, ChatSessionsResponse},
    error::Result,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/web/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Mentor reply", body = Json<ChatReplyResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Chat session not found"),
        (status = 502, description = "Completion endpoint failed")
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reply = state.chat.send(claims.sub, payload).await?;
    Ok(Json(reply))
}

#[utoipa::path(
    get,
    path = "/api/web/chat/sessions",
    responses(
        (status = 200, description = "Chat sessions, newest first", body = Json<ChatSessionsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let sessions = state.chat.sessions(claims.sub).await?;
    Ok(Json(ChatSessionsResponse { sessions }))
}

#[utoipa::path(
    get,
    path = "/api/web/chat/history/{id}",
    params(
        ("id" = Uuid, Path, description = "Chat session ID")
    ),
    responses(
        (status = 200, description = "Session with its messages", body = Json<ChatHistoryResponse>),
        (status = 404, description = "Chat session not found")
    )
)]
#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (session, messages) = state.chat.history(claims.sub, id).await?;
    Ok(Json(ChatHistoryResponse { session, messages }))
}

#[utoipa::path(
    delete,
    path = "/api/web/chat/sessions",
    responses(
        (status = 200, description = "All chats of the user deleted", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn delete_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let deleted = state.chat.delete_all(claims.sub).await?;
    Ok(Json(json!({ "message": "Chat history deleted", "deletedSessions": deleted })))
}
