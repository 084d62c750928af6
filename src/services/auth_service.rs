use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::dto::auth_dto::{
    LoginPayload, RegisterMentorPayload, RegisterPayload, UpdateProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::mentor::SocialLinks;
use crate::models::user::{OnboardingData, User};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::{ROLE_MENTOR, ROLE_USER};

const USER_COLUMNS: &str = r#"
    id, username, email, phone, password_hash, display_name, avatar_url,
    onboarding_data, created_at, updated_at
"#;

/// Accounts, credentials and the profile fields users edit themselves.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let password_hash = hash_password(&payload.password)?;
        let onboarding = payload.onboarding_data.unwrap_or_default();
        let email = normalize_email(payload.email.as_deref());

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, phone, password_hash, display_name, onboarding_data)
            VALUES ($1, $2, $3, $4, $1, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(payload.username.trim())
        .bind(email)
        .bind(payload.phone)
        .bind(password_hash)
        .bind(Json(onboarding))
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_account)?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Creates the login account and the mentor profile together.
    pub async fn register_mentor(&self, payload: RegisterMentorPayload) -> Result<User> {
        let password_hash = hash_password(&payload.password)?;
        let email = normalize_email(Some(&payload.email));
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, display_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(payload.username.trim())
        .bind(&email)
        .bind(password_hash)
        .bind(payload.name.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_account)?;

        sqlx::query(
            r#"
            INSERT INTO mentors (
                user_id, name, email, skills, experience, hourly_rate, bio,
                social_links, specializations, languages, timezone
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&payload.skills)
        .bind(&payload.experience)
        .bind(payload.hourly_rate_decimal())
        .bind(payload.bio.clone().unwrap_or_default())
        .bind(Json(payload.social_links.clone().unwrap_or_else(SocialLinks::default)))
        .bind(payload.specializations.clone().unwrap_or_default())
        .bind(payload.languages_or_default())
        .bind(payload.timezone.clone().unwrap_or_else(|| "UTC".to_string()))
        .execute(&mut *tx)
        .await
        .map_err(duplicate_account)?;

        tx.commit().await?;
        tracing::info!(user_id = %user.id, "mentor registered");
        Ok(user)
    }

    /// Username or email; the role comes from whether a mentor profile exists.
    pub async fn login(&self, payload: LoginPayload) -> Result<(User, &'static str)> {
        let identifier = payload.username.trim();
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = LOWER($1) LIMIT 1",
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        };
        if !verify_password(&payload.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        let role = self.role_of(user.id).await?;
        Ok((user, role))
    }

    pub async fn role_of(&self, user_id: Uuid) -> Result<&'static str> {
        let is_mentor: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM mentors WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(if is_mentor { ROLE_MENTOR } else { ROLE_USER })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, user_id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                display_name = COALESCE($2, display_name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(payload.display_name.map(|name| name.trim().to_string()))
        .bind(payload.avatar_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn set_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn save_onboarding(&self, user_id: Uuid, data: OnboardingData) -> Result<OnboardingData> {
        let saved: Option<Json<OnboardingData>> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET onboarding_data = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING onboarding_data
            "#,
        )
        .bind(user_id)
        .bind(Json(&data))
        .fetch_optional(&self.pool)
        .await?;

        saved
            .map(|json| json.0)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn onboarding(&self, user_id: Uuid) -> Result<OnboardingData> {
        Ok(self.get_user(user_id).await?.onboarding_data.0)
    }
}

fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn duplicate_account(err: sqlx::Error) -> Error {
    match Error::from(err) {
        Error::Conflict(_) => Error::Conflict("Username or email already exists".to_string()),
        other => other,
    }
}
