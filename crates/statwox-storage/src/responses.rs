use std::collections::HashMap;

use jiff::Timestamp;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use statwox_core::models::answer::{Answer, NewAnswer};
use statwox_core::models::response::{Response, ResponseMetadata, ResponseRecord};

use crate::error::StorageError;
use crate::rows::{AnswerRow, ResponseRow, micros};
use crate::surveys;

/// A validated, complete submission ready to persist.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub survey_id: Uuid,
    pub respondent_id: Option<Uuid>,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub duration: Option<u32>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub metadata: ResponseMetadata,
    pub answers: Vec<NewAnswer>,
}

/// Which responses to load for aggregation, newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseWindow {
    /// `None` loads every response.
    pub limit: Option<u32>,
    pub complete_only: bool,
}

/// Persist a complete response with its answers.
///
/// One transaction claims a quota slot (incrementing `response_count`),
/// inserts the response and inserts every answer. Fails with
/// `QuotaExceeded` when the survey is full and with `Duplicate("response")`
/// when the respondent already has a complete response to this survey; in
/// both cases nothing is written.
pub async fn submit(pool: &SqlitePool, new: &NewResponse) -> Result<Response, StorageError> {
    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    surveys::claim_response_slot(&mut *tx, new.survey_id).await?;

    sqlx::query(
        r#"
        INSERT INTO responses
            (id, survey_id, respondent_id, is_complete, started_at, completed_at,
             ip_address, user_agent, duration, flagged, flag_reason, metadata)
        VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(new.survey_id.to_string())
    .bind(new.respondent_id.map(|r| r.to_string()))
    .bind(micros(new.started_at))
    .bind(micros(new.completed_at))
    .bind(&new.ip_address)
    .bind(&new.user_agent)
    .bind(new.duration)
    .bind(new.flagged)
    .bind(&new.flag_reason)
    .bind(serde_json::to_string(&new.metadata)?)
    .execute(&mut *tx)
    .await
    .map_err(StorageError::on_unique("response"))?;

    for answer in &new.answers {
        sqlx::query(
            r#"
            INSERT INTO answers (id, response_id, question_id, value, file_url, signature_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id.to_string())
        .bind(answer.question_id.to_string())
        .bind(&answer.value)
        .bind(&answer.file_url)
        .bind(&answer.signature_url)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        response_id = %id,
        survey_id = %new.survey_id,
        answers = new.answers.len(),
        flagged = new.flagged,
        "stored response"
    );

    Ok(Response {
        id,
        survey_id: new.survey_id,
        respondent_id: new.respondent_id,
        is_complete: true,
        started_at: new.started_at,
        completed_at: Some(new.completed_at),
        ip_address: new.ip_address.clone(),
        user_agent: new.user_agent.clone(),
        duration: new.duration,
        flagged: new.flagged,
        flag_reason: new.flag_reason.clone(),
        metadata: new.metadata.clone(),
    })
}

/// Whether `respondent_id` already completed this survey.
pub async fn has_completed(
    pool: &SqlitePool,
    survey_id: Uuid,
    respondent_id: Uuid,
) -> Result<bool, StorageError> {
    let n: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM responses
        WHERE survey_id = ? AND respondent_id = ? AND is_complete = 1
        "#,
    )
    .bind(survey_id.to_string())
    .bind(respondent_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(n > 0)
}

/// Responses with their answers, newest first.
pub async fn list_records(
    pool: &SqlitePool,
    survey_id: Uuid,
    window: ResponseWindow,
) -> Result<Vec<ResponseRecord>, StorageError> {
    // SQLite treats a negative LIMIT as no limit.
    let limit = window.limit.map_or(-1, i64::from);

    let rows: Vec<ResponseRow> = sqlx::query_as(
        r#"
        SELECT * FROM responses
        WHERE survey_id = ?1 AND (?2 = 0 OR is_complete = 1)
        ORDER BY started_at DESC, rowid DESC
        LIMIT ?3
        "#,
    )
    .bind(survey_id.to_string())
    .bind(window.complete_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let answer_rows: Vec<AnswerRow> = sqlx::query_as(
        r#"
        SELECT * FROM answers
        WHERE response_id IN (
            SELECT id FROM responses
            WHERE survey_id = ?1 AND (?2 = 0 OR is_complete = 1)
            ORDER BY started_at DESC, rowid DESC
            LIMIT ?3
        )
        ORDER BY rowid
        "#,
    )
    .bind(survey_id.to_string())
    .bind(window.complete_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut answers: HashMap<Uuid, Vec<Answer>> = HashMap::new();
    for row in answer_rows {
        let answer = Answer::try_from(row)?;
        answers.entry(answer.response_id).or_default().push(answer);
    }

    rows.into_iter()
        .map(|row| {
            let response = Response::try_from(row)?;
            let answers = answers.remove(&response.id).unwrap_or_default();
            Ok(ResponseRecord { response, answers })
        })
        .collect()
}
