use axum::extract::State;
use axum::{Extension, Json};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::info;

use statwox_audit::events::{AuditAction, AuditEvent, EntityType};
use statwox_auth::error::AuthError;
use statwox_auth::password::{hash_password, verify_password};
use statwox_core::models::user::User;
use statwox_storage::error::StorageError;
use statwox_storage::users::{self, NewUser};

use crate::audit_trail;
use crate::envelope::{Envelope, ok, ok_with_message};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::routes::{blocking, clean};
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A signed-in user and their session token.
#[derive(Debug, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<Json<Envelope<Session>>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".to_string()));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let cost = state.config.bcrypt_cost;
    let password = body.password;
    let password_hash = blocking(move || hash_password(&password, cost)).await??;

    let username = clean(body.username);
    let new_user = NewUser {
        email,
        name: clean(body.name).or_else(|| username.clone()),
        username,
        password_hash,
    };

    let user = users::create(&state.pool, &new_user, Timestamp::now())
        .await
        .map_err(|e| match e {
            StorageError::Duplicate(_) => {
                ApiError::Conflict("Email or username already registered".to_string())
            }
            other => other.into(),
        })?;

    let token = state.signer.sign(user.id, &user.email)?;
    info!(user_id = %user.id, "registered user");

    Ok(ok_with_message("Account created successfully", Session { user, token }))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<Envelope<Session>>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".to_string()));
    }

    let Some((user, hash)) = users::find_credentials(&state.pool, &email).await? else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let password = body.password;
    if !blocking(move || verify_password(&password, &hash)).await?? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.signer.sign(user.id, &user.email)?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Login, EntityType::User, user.id, user.id),
    )
    .await;

    Ok(ok_with_message("Login successful", Session { user, token }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = users::get(&state.pool, auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ok(user))
}
