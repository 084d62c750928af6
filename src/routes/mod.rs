pub mod analytics;
pub mod auth;
pub mod chat;
pub mod content;
pub mod health;
pub mod mentor;
pub mod onboarding;
pub mod profile;
pub mod progress;
