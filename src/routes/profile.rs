use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{UpdateProfilePayload, UserResponse},
    error::{Error, Result},
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the current user", body = Json<serde_json::Value>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth.get_user(claims.sub).await?;
    Ok(Json(json!({ "user": UserResponse::new(user, &claims.role) })))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth.update_profile(claims.sub, payload).await?;
    Ok(Json(json!({ "user": UserResponse::new(user, &claims.role) })))
}

#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    request_body(content = String, description = "Image in the `avatar` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored", body = Json<serde_json::Value>),
        (status = 400, description = "Missing, empty or unsupported image"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut avatar_url = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let data = field.bytes().await?;
        avatar_url = Some(state.avatars.save(claims.sub, &file_name, &data).await?);
        break;
    }

    let avatar_url =
        avatar_url.ok_or_else(|| Error::BadRequest("No avatar file provided".to_string()))?;
    let user = state.auth.set_avatar(claims.sub, &avatar_url).await?;

    Ok(Json(json!({
        "avatarUrl": avatar_url,
        "user": UserResponse::new(user, &claims.role),
    })))
}
