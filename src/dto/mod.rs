pub mod analytics_dto;
pub mod auth_dto;
pub mod chat_dto;
pub mod content_dto;
pub mod mentor_dto;
pub mod onboarding_dto;
pub mod progress_dto;
