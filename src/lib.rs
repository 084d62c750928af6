pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use sqlx::PgPool;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::middleware::{
    auth::{optional_auth, require_auth, require_mentor},
    cors::frontend_cors,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::services::{
    analytics_service::AnalyticsService, auth_service::AuthService, avatar_service::AvatarStore,
    chat_service::ChatService,
    completion_service::CompletionClient, content_service::ContentService,
    mentor_service::MentorService, progress_service::ProgressService,
    recommendation_service::RecommendationService, roadmap_service::RoadmapService,
};
use crate::utils::token::JwtKeys;

/// Per-attempt timeout for calls to the completion endpoint.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: JwtKeys,
    pub content: ContentService,
    pub auth: AuthService,
    pub avatars: AvatarStore,
    pub roadmap: RoadmapService,
    pub recommendations: RecommendationService,
    pub chat: ChatService,
    pub progress: ProgressService,
    pub analytics: AnalyticsService,
    pub mentors: MentorService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let completion = CompletionClient::new(config.completion.clone(), http_client);
        Ok(Self::with_completion(pool, config, completion))
    }

    /// Builds the state around an already configured completion client.
    pub fn with_completion(pool: PgPool, config: &Config, completion: CompletionClient) -> Self {
        let content = ContentService::new(completion.clone());

        Self {
            jwt: JwtKeys::new(&config.jwt_secret, config.token_ttl_hours),
            auth: AuthService::new(pool.clone()),
            avatars: AvatarStore::new(&config.uploads_dir),
            roadmap: RoadmapService::new(pool.clone(), content.clone()),
            recommendations: RecommendationService::new(pool.clone(), content.clone()),
            chat: ChatService::new(pool.clone(), completion),
            progress: ProgressService::new(pool.clone()),
            analytics: AnalyticsService::new(pool.clone()),
            mentors: MentorService::new(pool.clone()),
            content,
            pool,
        }
    }
}

pub fn app(state: AppState, config: &Config) -> Router {
    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/register-mentor", post(routes::auth::register_mentor))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .layer(from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/mentors", get(routes::mentor::list_mentors))
        .route("/api/public/exercises", post(routes::content::public_exercises))
        .route("/api/web/lecture", post(routes::content::lecture))
        .route("/api/web/lecture/modular", post(routes::content::modular_lecture))
        .route_layer(from_fn_with_state(state.clone(), optional_auth));

    let user_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route("/api/profile/avatar", post(routes::profile::upload_avatar))
        .route("/api/onboarding/save", post(routes::onboarding::save_onboarding))
        .route("/api/onboarding/data", get(routes::onboarding::get_onboarding))
        .route("/api/onboarding/status", get(routes::onboarding::onboarding_status))
        .route("/api/web/roadmap", post(routes::content::roadmap))
        .route("/api/web/exercises", post(routes::content::exercises))
        .route(
            "/api/web/personalized-content",
            post(routes::content::personalized_content),
        )
        .route("/api/web/chat", post(routes::chat::send_message))
        .route(
            "/api/web/chat/sessions",
            get(routes::chat::list_sessions).delete(routes::chat::delete_sessions),
        )
        .route("/api/web/chat/history/:id", get(routes::chat::history))
        .route(
            "/api/web/progress",
            get(routes::progress::get_progress).post(routes::progress::update_progress),
        )
        .route("/api/web/progress/:topic", get(routes::progress::get_topic_progress))
        .route("/api/web/analytics", get(routes::analytics::get_analytics))
        .route("/api/web/analytics/global", get(routes::analytics::global_analytics))
        .route(
            "/api/web/analytics/topic-view",
            post(routes::analytics::track_topic_view),
        )
        .route(
            "/api/web/analytics/topic-completion",
            post(routes::analytics::track_topic_completion),
        )
        .route(
            "/api/web/analytics/exercise-activity",
            post(routes::analytics::track_exercise_activity),
        )
        .route("/api/web/analytics/rate-topic", post(routes::analytics::rate_topic))
        .route("/api/mentors/:id/connect", post(routes::mentor::connect))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mentor_api = Router::new()
        .route("/api/mentor/dashboard", get(routes::mentor::dashboard))
        .route("/api/mentor/students", get(routes::mentor::students))
        .route(
            "/api/mentor/students/:student_id/roadmaps",
            get(routes::mentor::student_roadmaps),
        )
        .route_layer(from_fn_with_state(state.clone(), require_mentor));

    base_routes
        .merge(auth_api)
        .merge(public_api)
        .merge(user_api)
        .merge(mentor_api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(frontend_cors(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

