use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{AuthResponse, LoginPayload, RegisterMentorPayload, RegisterPayload, UserResponse},
    error::Result,
    models::user::User,
    utils::token::{clear_auth_cookie, Claims, ROLE_MENTOR, ROLE_USER},
    AppState,
};

fn issue_session(state: &AppState, user: User, role: &str) -> Result<(String, AuthResponse)> {
    let token = state.jwt.issue(user.id, role)?;
    let cookie = state.jwt.auth_cookie(&token);
    Ok((
        cookie,
        AuthResponse {
            token,
            user: UserResponse::new(user, role),
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User registered", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username or email already exists")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth.register(payload).await?;
    let (cookie, body) = issue_session(&state, user, ROLE_USER)?;
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/auth/register-mentor",
    request_body = RegisterMentorPayload,
    responses(
        (status = 201, description = "Mentor registered", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username or email already exists")
    )
)]
#[axum::debug_handler]
pub async fn register_mentor(
    State(state): State<AppState>,
    Json(payload): Json<RegisterMentorPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth.register_mentor(payload).await?;
    let (cookie, body) = issue_session(&state, user, ROLE_MENTOR)?;
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = Json<serde_json::Value>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (user, role) = state.auth.login(payload).await?;
    let (cookie, body) = issue_session(&state, user, role)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
#[axum::debug_handler]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_auth_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Json<serde_json::Value>),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth.get_user(claims.sub).await?;
    Ok(Json(json!({ "user": UserResponse::new(user, &claims.role) })))
}
