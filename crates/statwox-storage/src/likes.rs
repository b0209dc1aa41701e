use jiff::Timestamp;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::StorageError;
use crate::rows::micros;

pub async fn is_liked(pool: &SqlitePool, user_id: Uuid, survey_id: Uuid) -> Result<bool, StorageError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ? AND survey_id = ?")
        .bind(user_id.to_string())
        .bind(survey_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(n > 0)
}

/// Record a like and bump `like_count`. A second like by the same user is
/// `Duplicate("like")`.
pub async fn like(
    pool: &SqlitePool,
    user_id: Uuid,
    survey_id: Uuid,
    now: Timestamp,
) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO likes (id, user_id, survey_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(survey_id.to_string())
        .bind(micros(now))
        .execute(&mut *tx)
        .await
        .map_err(StorageError::on_unique("like"))?;

    sqlx::query("UPDATE surveys SET like_count = like_count + 1 WHERE id = ?")
        .bind(survey_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a like and decrement `like_count`. Removing a like that does not
/// exist is `NotFound`.
pub async fn unlike(pool: &SqlitePool, user_id: Uuid, survey_id: Uuid) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND survey_id = ?")
        .bind(user_id.to_string())
        .bind(survey_id.to_string())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("like", survey_id));
    }

    sqlx::query("UPDATE surveys SET like_count = MAX(like_count - 1, 0) WHERE id = ?")
        .bind(survey_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
