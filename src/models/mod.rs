pub mod analytics;
pub mod chat;
pub mod content;
pub mod mentor;
pub mod progress;
pub mod roadmap;
pub mod user;
