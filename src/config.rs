use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cors_origin: String,
    pub public_rps: u32,
    pub uploads_dir: String,
    pub completion: CompletionConfig,
}

/// Settings for the upstream completion endpoint. Handed to the completion
/// client once at construction and never re-read from the environment.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:5000"),
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            token_ttl_hours: get_env_parse_or("TOKEN_TTL_HOURS", 24)?,
            cors_origin: get_env_or("CORS_ORIGIN", "http://localhost:3000"),
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            completion: CompletionConfig {
                api_url: get_env_or("API_URL", DEFAULT_API_URL),
                model: get_env_or("MODEL", DEFAULT_MODEL),
                api_key: env::var("OPENROUTER_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
