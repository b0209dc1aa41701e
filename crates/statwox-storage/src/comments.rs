use jiff::Timestamp;
use sqlx::SqlitePool;
use uuid::Uuid;

use statwox_core::models::comment::{Comment, CommentThread};

use crate::error::StorageError;
use crate::rows::{CommentRow, micros};

const SELECT_COMMENT: &str = r#"
    SELECT c.id, c.survey_id, c.parent_id, c.content, c.created_at, c.updated_at,
           u.id AS author_id, u.name AS author_name, u.image AS author_image,
           u.username AS author_username
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// One page of top-level comments, newest first, each with its replies.
#[derive(Debug, Clone)]
pub struct CommentPage {
    pub threads: Vec<CommentThread>,
    /// Number of top-level comments on the survey.
    pub total: u32,
}

/// Insert a comment and bump the survey's `comment_count`.
pub async fn create(
    pool: &SqlitePool,
    survey_id: Uuid,
    author_id: Uuid,
    parent_id: Option<Uuid>,
    content: &str,
    now: Timestamp,
) -> Result<Comment, StorageError> {
    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO comments (id, survey_id, author_id, parent_id, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(survey_id.to_string())
    .bind(author_id.to_string())
    .bind(parent_id.map(|p| p.to_string()))
    .bind(content)
    .bind(micros(now))
    .bind(micros(now))
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE surveys SET comment_count = comment_count + 1 WHERE id = ?")
        .bind(survey_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get(pool, id).await?.ok_or_else(|| StorageError::not_found("comment", id))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Comment>, StorageError> {
    let row: Option<CommentRow> = sqlx::query_as(&format!("{SELECT_COMMENT} WHERE c.id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.map(Comment::try_from).transpose()
}

/// Top-level comments of a survey, newest first, with replies oldest first.
pub async fn list_threads(
    pool: &SqlitePool,
    survey_id: Uuid,
    page: u32,
    limit: u32,
) -> Result<CommentPage, StorageError> {
    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

    let parents: Vec<CommentRow> = sqlx::query_as(&format!(
        "{SELECT_COMMENT} WHERE c.survey_id = ? AND c.parent_id IS NULL \
         ORDER BY c.created_at DESC, c.id LIMIT ? OFFSET ?"
    ))
    .bind(survey_id.to_string())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let replies: Vec<CommentRow> = sqlx::query_as(&format!(
        "{SELECT_COMMENT} WHERE c.parent_id IN ( \
             SELECT id FROM comments WHERE survey_id = ? AND parent_id IS NULL \
             ORDER BY created_at DESC, id LIMIT ? OFFSET ?) \
         ORDER BY c.created_at ASC, c.id"
    ))
    .bind(survey_id.to_string())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: u32 =
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE survey_id = ? AND parent_id IS NULL")
            .bind(survey_id.to_string())
            .fetch_one(pool)
            .await?;

    let replies = replies
        .into_iter()
        .map(Comment::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let threads = parents
        .into_iter()
        .map(|row| {
            let comment = Comment::try_from(row)?;
            let replies = replies
                .iter()
                .filter(|r| r.parent_id == Some(comment.id))
                .cloned()
                .collect();
            Ok(CommentThread { comment, replies })
        })
        .collect::<Result<_, StorageError>>()?;

    Ok(CommentPage { threads, total })
}

pub async fn update_content(
    pool: &SqlitePool,
    id: Uuid,
    content: &str,
    now: Timestamp,
) -> Result<Comment, StorageError> {
    let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(micros(now))
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("comment", id));
    }

    get(pool, id).await?.ok_or_else(|| StorageError::not_found("comment", id))
}

/// Delete a comment with its replies and lower `comment_count` by the
/// number of rows removed, which is returned.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u32, StorageError> {
    let mut tx = pool.begin().await?;

    let survey_id: Option<String> = sqlx::query_scalar("SELECT survey_id FROM comments WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?;
    let Some(survey_id) = survey_id else {
        return Err(StorageError::not_found("comment", id));
    };

    let replies = sqlx::query("DELETE FROM comments WHERE parent_id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    let removed = u32::try_from(replies + 1).unwrap_or(u32::MAX);
    sqlx::query("UPDATE surveys SET comment_count = MAX(comment_count - ?, 0) WHERE id = ?")
        .bind(removed)
        .bind(&survey_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(removed)
}
