use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::onboarding_dto::{OnboardingPayload, OnboardingStatusResponse},
    error::{Error, Result},
    models::user::OnboardingData,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/onboarding/save",
    request_body = OnboardingPayload,
    responses(
        (status = 200, description = "Onboarding saved", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn save_onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<OnboardingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let data = state
        .auth
        .save_onboarding(claims.sub, OnboardingData::from(payload))
        .await?;
    tracing::info!(user_id = %claims.sub, "onboarding completed");
    Ok(Json(json!({ "message": "Onboarding data saved", "onboardingData": data })))
}

#[utoipa::path(
    get,
    path = "/api/onboarding/data",
    responses(
        (status = 200, description = "Stored onboarding answers", body = Json<serde_json::Value>),
        (status = 404, description = "Onboarding not completed")
    )
)]
#[axum::debug_handler]
pub async fn get_onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let data = state.auth.onboarding(claims.sub).await?;
    if !data.completed {
        return Err(Error::NotFound("Onboarding not completed".to_string()));
    }
    Ok(Json(json!({ "onboardingData": data })))
}

#[utoipa::path(
    get,
    path = "/api/onboarding/status",
    responses(
        (status = 200, description = "Whether onboarding is completed", body = Json<OnboardingStatusResponse>)
    )
)]
#[axum::debug_handler]
pub async fn onboarding_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let data = state.auth.onboarding(claims.sub).await?;
    Ok(Json(OnboardingStatusResponse {
        completed: data.completed,
    }))
}
