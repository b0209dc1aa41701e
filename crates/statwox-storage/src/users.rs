use jiff::Timestamp;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use statwox_core::models::user::User;

use crate::error::StorageError;
use crate::rows::{UserRow, micros};

/// Account fields supplied at registration. `password_hash` is already
/// hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub password_hash: String,
}

/// Insert a user. A taken email or username yields `Duplicate("user")`.
pub async fn create(pool: &SqlitePool, new: &NewUser, now: Timestamp) -> Result<User, StorageError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, name, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&new.email)
    .bind(&new.username)
    .bind(&new.name)
    .bind(&new.password_hash)
    .bind(micros(now))
    .execute(pool)
    .await
    .map_err(StorageError::on_unique("user"))?;

    info!(user_id = %id, "created user");
    get(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("user", id))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, StorageError> {
    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| r.into_user().map(|(user, _)| user)).transpose()
}

/// The user registered under `email` together with their password hash.
pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<(User, String)>, StorageError> {
    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(UserRow::into_user).transpose()
}
