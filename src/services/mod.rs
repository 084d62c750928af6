pub mod analytics_service;
pub mod auth_service;
pub mod avatar_service;
pub mod chat_service;
pub mod completion_service;
pub mod content;
pub mod content_service;
pub mod mentor_service;
pub mod progress_service;
pub mod recommendation_service;
pub mod roadmap_service;
