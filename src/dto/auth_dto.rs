use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::mentor::SocialLinks;
use crate::models::user::{OnboardingData, User};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub onboarding_data: Option<OnboardingData>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMentorPayload {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub skills: Vec<String>,
    #[validate(length(min = 1))]
    pub experience: String,
    #[validate(range(min = 0.01, message = "Hourly rate must be positive"))]
    pub hourly_rate: f64,
    pub bio: Option<String>,
    pub specializations: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl RegisterMentorPayload {
    pub fn hourly_rate_decimal(&self) -> Decimal {
        Decimal::from_f64_retain(self.hourly_rate)
            .map(|rate| rate.round_dp(2))
            .unwrap_or_default()
    }

    pub fn languages_or_default(&self) -> Vec<String> {
        match &self.languages {
            Some(languages) if !languages.is_empty() => languages.clone(),
            _ => vec!["English".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 500))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
    pub avatar_url: String,
    pub role: String,
    pub onboarding_completed: bool,
}

impl UserResponse {
    pub fn new(user: User, role: &str) -> Self {
        Self {
            id: user.id,
            onboarding_completed: user.onboarding_data.completed,
            username: user.username,
            email: user.email,
            phone: user.phone,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            role: role.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor_payload(json: &str) -> RegisterMentorPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn mentor_defaults() {
        let payload = mentor_payload(
            r#"{"username":"guide","name":"Guide","email":"g@example.com","password":"secret1",
                "skills":["Rust"],"experience":"5 years","hourlyRate":42.456}"#,
        );
        assert!(payload.validate().is_ok());
        assert_eq!(payload.languages_or_default(), vec!["English"]);
        assert_eq!(payload.hourly_rate_decimal().to_string(), "42.46");
    }

    #[test]
    fn mentor_needs_skills_and_positive_rate() {
        let payload = mentor_payload(
            r#"{"username":"guide","name":"Guide","email":"g@example.com","password":"secret1",
                "skills":[],"experience":"5 years","hourlyRate":0}"#,
        );
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("skills"));
        assert!(fields.contains_key("hourly_rate"));
    }

    #[test]
    fn register_rejects_short_credentials() {
        let payload: RegisterPayload =
            serde_json::from_str(r#"{"username":"ab","password":"123"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
