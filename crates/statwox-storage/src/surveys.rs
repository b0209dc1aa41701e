use jiff::Timestamp;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use statwox_core::models::survey::{ShareType, Survey, SurveyCategory, SurveyStatus};

use crate::error::StorageError;
use crate::questions::{self, NewQuestion};
use crate::rows::{SurveyRow, micros};

/// A survey as authored, before it has an ID or counters. New surveys are
/// always drafts.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: SurveyCategory,
    pub is_public: bool,
    pub share_type: ShareType,
    pub allow_anon: bool,
    pub conversational: bool,
    pub max_responses: Option<u32>,
    pub closes_at: Option<Timestamp>,
    pub password_hash: Option<String>,
    pub ip_allowlist: Vec<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub theme: Option<serde_json::Value>,
    pub locale: Option<String>,
    pub translations: Option<serde_json::Value>,
    pub thank_you_message: Option<String>,
    pub redirect_url: Option<String>,
    pub show_progress: bool,
    pub show_question_numbers: bool,
    pub shuffle_questions: bool,
    pub questions: Vec<NewQuestion>,
}

/// Which surveys a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyScope {
    AuthoredBy(Uuid),
    /// Public, published surveys from every author.
    Public,
}

/// One page of a listing, most recently updated first.
#[derive(Debug, Clone)]
pub struct SurveyPage {
    pub surveys: Vec<Survey>,
    pub total: u32,
}

/// Insert a draft survey and its questions in one transaction.
pub async fn create(pool: &SqlitePool, new: &NewSurvey, now: Timestamp) -> Result<Survey, StorageError> {
    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO surveys
            (id, author_id, title, description, category, status, is_public, share_type,
             allow_anon, conversational, max_responses, closes_at, password_hash, ip_allowlist,
             webhook_url, webhook_secret, theme, locale, translations, thank_you_message,
             redirect_url, show_progress, show_question_numbers, shuffle_questions,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(new.author_id.to_string())
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.category.as_str())
    .bind(SurveyStatus::Draft.as_str())
    .bind(new.is_public)
    .bind(new.share_type.as_str())
    .bind(new.allow_anon)
    .bind(new.conversational)
    .bind(new.max_responses)
    .bind(new.closes_at.map(micros))
    .bind(&new.password_hash)
    .bind(serde_json::to_string(&new.ip_allowlist)?)
    .bind(&new.webhook_url)
    .bind(&new.webhook_secret)
    .bind(json_text(new.theme.as_ref())?)
    .bind(&new.locale)
    .bind(json_text(new.translations.as_ref())?)
    .bind(&new.thank_you_message)
    .bind(&new.redirect_url)
    .bind(new.show_progress)
    .bind(new.show_question_numbers)
    .bind(new.shuffle_questions)
    .bind(micros(now))
    .bind(micros(now))
    .execute(&mut *tx)
    .await?;

    questions::replace_all(&mut *tx, id, &new.questions).await?;
    tx.commit().await?;

    info!(survey_id = %id, author_id = %new.author_id, "created survey");
    require(pool, id).await
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Survey>, StorageError> {
    let row: Option<SurveyRow> = sqlx::query_as("SELECT * FROM surveys WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(Survey::try_from).transpose()
}

/// Like [`get`], but a missing survey is `NotFound`.
pub async fn require(pool: &SqlitePool, id: Uuid) -> Result<Survey, StorageError> {
    get(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("survey", id))
}

/// `page` is 1-based.
pub async fn list(
    pool: &SqlitePool,
    scope: SurveyScope,
    page: u32,
    limit: u32,
) -> Result<SurveyPage, StorageError> {
    let (author, public_only) = match scope {
        SurveyScope::AuthoredBy(author_id) => (Some(author_id.to_string()), false),
        SurveyScope::Public => (None, true),
    };
    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

    let rows: Vec<SurveyRow> = sqlx::query_as(
        r#"
        SELECT * FROM surveys
        WHERE (?1 IS NULL OR author_id = ?1)
          AND (?2 = 0 OR (is_public = 1 AND status = 'published'))
        ORDER BY updated_at DESC, id
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(&author)
    .bind(public_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: u32 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM surveys
        WHERE (?1 IS NULL OR author_id = ?1)
          AND (?2 = 0 OR (is_public = 1 AND status = 'published'))
        "#,
    )
    .bind(&author)
    .bind(public_only)
    .fetch_one(pool)
    .await?;

    Ok(SurveyPage {
        surveys: rows
            .into_iter()
            .map(Survey::try_from)
            .collect::<Result<_, _>>()?,
        total,
    })
}

/// Write every authored field of `survey` back and bump `updated_at`.
///
/// When `questions` is given the whole question set is replaced in the same
/// transaction; question IDs do not survive the replacement. Counters,
/// status and publication time are left alone.
pub async fn update(
    pool: &SqlitePool,
    survey: &Survey,
    questions: Option<&[NewQuestion]>,
    now: Timestamp,
) -> Result<Survey, StorageError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE surveys SET
            title = ?, description = ?, category = ?, is_public = ?, share_type = ?,
            allow_anon = ?, conversational = ?, max_responses = ?, closes_at = ?,
            password_hash = ?, ip_allowlist = ?, webhook_url = ?, webhook_secret = ?,
            theme = ?, locale = ?, translations = ?, thank_you_message = ?, redirect_url = ?,
            show_progress = ?, show_question_numbers = ?, shuffle_questions = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&survey.title)
    .bind(&survey.description)
    .bind(survey.category.as_str())
    .bind(survey.is_public)
    .bind(survey.share_type.as_str())
    .bind(survey.allow_anon)
    .bind(survey.conversational)
    .bind(survey.max_responses)
    .bind(survey.closes_at.map(micros))
    .bind(&survey.password_hash)
    .bind(serde_json::to_string(&survey.ip_allowlist)?)
    .bind(&survey.webhook_url)
    .bind(&survey.webhook_secret)
    .bind(json_text(survey.theme.as_ref())?)
    .bind(&survey.locale)
    .bind(json_text(survey.translations.as_ref())?)
    .bind(&survey.thank_you_message)
    .bind(&survey.redirect_url)
    .bind(survey.show_progress)
    .bind(survey.show_question_numbers)
    .bind(survey.shuffle_questions)
    .bind(micros(now))
    .bind(survey.id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("survey", survey.id));
    }

    if let Some(questions) = questions {
        questions::replace_all(&mut *tx, survey.id, questions).await?;
    }
    tx.commit().await?;

    info!(survey_id = %survey.id, questions_replaced = questions.is_some(), "updated survey");
    require(pool, survey.id).await
}

/// Delete a survey. Questions, responses, answers and likes go with it.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), StorageError> {
    let result = sqlx::query("DELETE FROM surveys WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("survey", id));
    }

    info!(survey_id = %id, "deleted survey");
    Ok(())
}

/// Move a survey to `status`. Publishing stamps `published_at`, returning
/// to draft clears it and closing keeps it.
pub async fn set_status(
    pool: &SqlitePool,
    id: Uuid,
    status: SurveyStatus,
    now: Timestamp,
) -> Result<Survey, StorageError> {
    let result = sqlx::query(
        r#"
        UPDATE surveys
        SET status = ?1,
            published_at = CASE ?1 WHEN 'published' THEN ?2 WHEN 'draft' THEN NULL ELSE published_at END,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(status.as_str())
    .bind(micros(now))
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("survey", id));
    }

    info!(survey_id = %id, status = %status, "changed survey status");
    require(pool, id).await
}

/// Count one view.
pub async fn record_view(pool: &SqlitePool, id: Uuid) -> Result<(), StorageError> {
    sqlx::query("UPDATE surveys SET view_count = view_count + 1 WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Take one slot of the survey's response quota and count the response.
///
/// The check and the increment are one statement, so concurrent
/// submissions cannot overshoot `max_responses`.
pub(crate) async fn claim_response_slot(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<(), StorageError> {
    let result = sqlx::query(
        r#"
        UPDATE surveys SET response_count = response_count + 1
        WHERE id = ? AND (max_responses IS NULL OR response_count < max_responses)
        "#,
    )
    .bind(id.to_string())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM surveys WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&mut *conn)
        .await?;

    if exists == 0 {
        Err(StorageError::not_found("survey", id))
    } else {
        Err(StorageError::QuotaExceeded(id))
    }
}

fn json_text(value: Option<&serde_json::Value>) -> Result<Option<String>, StorageError> {
    Ok(value.map(serde_json::to_string).transpose()?)
}
