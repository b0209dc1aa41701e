use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use statwox_core::models::question::{Question, QuestionOptions, QuestionType, SkipLogicRule};

use crate::error::StorageError;
use crate::rows::QuestionRow;

/// A question as authored. Its `order` is its position in the submitted
/// list.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_type: QuestionType,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub options: Option<QuestionOptions>,
    pub page: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub placeholder: Option<String>,
    pub logic: Vec<SkipLogicRule>,
}

/// The survey's questions in ascending order.
pub async fn list(pool: &SqlitePool, survey_id: Uuid) -> Result<Vec<Question>, StorageError> {
    let rows: Vec<QuestionRow> =
        sqlx::query_as("SELECT * FROM questions WHERE survey_id = ? ORDER BY sort_order, rowid")
            .bind(survey_id.to_string())
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(Question::try_from).collect()
}

pub async fn count(pool: &SqlitePool, survey_id: Uuid) -> Result<u32, StorageError> {
    let n: u32 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE survey_id = ?")
        .bind(survey_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Delete the survey's questions and insert `questions` in their place.
/// Callers run this inside the transaction that owns the survey write.
pub(crate) async fn replace_all(
    conn: &mut SqliteConnection,
    survey_id: Uuid,
    questions: &[NewQuestion],
) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM questions WHERE survey_id = ?")
        .bind(survey_id.to_string())
        .execute(&mut *conn)
        .await?;

    for (index, question) in questions.iter().enumerate() {
        let options = question
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO questions
                (id, survey_id, type, title, description, required, options,
                 sort_order, page, min, max, placeholder, logic)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(survey_id.to_string())
        .bind(question.question_type.as_str())
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.required)
        .bind(options)
        .bind(i32::try_from(index).unwrap_or(i32::MAX))
        .bind(question.page)
        .bind(question.min)
        .bind(question.max)
        .bind(&question.placeholder)
        .bind(serde_json::to_string(&question.logic)?)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
