use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::content_dto::{
        require_topic, ExercisesPayload, ExercisesResponse, LecturePayload, LectureResponse,
        PersonalizedContentPayload, RecommendedTopicsResponse, RoadmapPayload, RoadmapResponse,
        RECOMMENDED_TOPICS,
    },
    error::{Error, Result},
    models::{content::ContentSource, user::OnboardingData},
    utils::token::Claims,
    AppState,
};

/// Tells clients whether a body came from the model or from templates.
pub const CONTENT_SOURCE_HEADER: &str = "x-content-source";

fn with_source<T>(source: ContentSource, body: T) -> impl IntoResponse
where
    T: serde::Serialize,
{
    ([(CONTENT_SOURCE_HEADER, source.as_str())], Json(body))
}

#[utoipa::path(
    post,
    path = "/api/web/roadmap",
    request_body = RoadmapPayload,
    responses(
        (status = 200, description = "Ordered learning steps", body = Json<RoadmapResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn roadmap(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RoadmapPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let topic = require_topic(&payload.topic)?;
    let generated = state.roadmap.roadmap_for(claims.sub, topic).await?;
    Ok(with_source(
        generated.source,
        RoadmapResponse {
            roadmap: generated.content,
        },
    ))
}

async fn lecture_response(state: &AppState, payload: &LecturePayload, modular: bool) -> Result<impl IntoResponse> {
    payload.validate()?;
    let topic = require_topic(&payload.topic)?;
    let generated = state.content.lecture(topic, payload.difficulty(), modular).await?;
    Ok(with_source(
        generated.source,
        LectureResponse {
            lecture: generated.content,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/web/lecture",
    request_body = LecturePayload,
    responses(
        (status = 200, description = "Generated lecture", body = Json<LectureResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Completion endpoint not configured")
    )
)]
#[axum::debug_handler]
pub async fn lecture(
    State(state): State<AppState>,
    Json(payload): Json<LecturePayload>,
) -> Result<impl IntoResponse> {
    lecture_response(&state, &payload, payload.modular).await
}

#[utoipa::path(
    post,
    path = "/api/web/lecture/modular",
    request_body = LecturePayload,
    responses(
        (status = 200, description = "Generated lecture split into modules", body = Json<LectureResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn modular_lecture(
    State(state): State<AppState>,
    Json(payload): Json<LecturePayload>,
) -> Result<impl IntoResponse> {
    lecture_response(&state, &payload, true).await
}

async fn exercises_response(state: &AppState, payload: ExercisesPayload) -> Result<impl IntoResponse> {
    payload.validate()?;
    let topic = require_topic(&payload.topic)?.to_string();
    let (quiz_count, coding_count) = payload.counts();
    let generated = state
        .content
        .exercises(&topic, payload.difficulty(), quiz_count, coding_count)
        .await?;
    Ok(with_source(
        generated.source,
        ExercisesResponse {
            exercises: generated.content,
            topic,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/web/exercises",
    request_body = ExercisesPayload,
    responses(
        (status = 200, description = "Quiz and coding exercises", body = Json<ExercisesResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn exercises(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ExercisesPayload>,
) -> Result<impl IntoResponse> {
    tracing::debug!(user_id = %claims.sub, topic = %payload.topic, "exercise request");
    exercises_response(&state, payload).await
}

#[utoipa::path(
    post,
    path = "/api/public/exercises",
    request_body = ExercisesPayload,
    responses(
        (status = 200, description = "Quiz and coding exercises", body = Json<ExercisesResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn public_exercises(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(payload): Json<ExercisesPayload>,
) -> Result<impl IntoResponse> {
    if let Some(Extension(claims)) = claims {
        tracing::debug!(user_id = %claims.sub, "public exercise request from signed-in user");
    }
    exercises_response(&state, payload).await
}

#[utoipa::path(
    post,
    path = "/api/web/personalized-content",
    request_body = PersonalizedContentPayload,
    responses(
        (status = 200, description = "Recommended topics", body = Json<RecommendedTopicsResponse>),
        (status = 400, description = "Unsupported content type"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn personalized_content(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PersonalizedContentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.content_type != RECOMMENDED_TOPICS {
        return Err(Error::BadRequest(format!(
            "Unsupported content type: {}",
            payload.content_type
        )));
    }

    let stored = state.auth.onboarding(claims.sub).await?;
    let profile = if stored.completed {
        stored
    } else {
        OnboardingData::anonymous()
    };
    let generated = state
        .recommendations
        .recommended_topics(claims.sub, &profile)
        .await?;
    Ok(with_source(
        generated.source,
        RecommendedTopicsResponse {
            recommended_topics: generated.content,
        },
    ))
}
