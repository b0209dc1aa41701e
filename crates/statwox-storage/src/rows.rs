//! Column-level row types and their conversion into domain models.

use jiff::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

use statwox_core::error::CoreError;
use statwox_core::models::answer::Answer;
use statwox_core::models::comment::{Comment, CommentAuthor};
use statwox_core::models::question::{Question, QuestionOptions, SkipLogicRule};
use statwox_core::models::response::{Response, ResponseMetadata};
use statwox_core::models::survey::Survey;
use statwox_core::models::user::User;

use crate::error::StorageError;

pub(crate) fn uuid(text: &str) -> Result<Uuid, StorageError> {
    Ok(Uuid::parse_str(text).map_err(CoreError::from)?)
}

pub(crate) fn micros(timestamp: Timestamp) -> i64 {
    timestamp.as_microsecond()
}

pub(crate) fn timestamp(micros: i64) -> Result<Timestamp, StorageError> {
    Ok(Timestamp::from_microsecond(micros)?)
}

fn optional_timestamp(micros: Option<i64>) -> Result<Option<Timestamp>, StorageError> {
    micros.map(timestamp).transpose()
}

fn optional_json(text: Option<String>) -> Result<Option<serde_json::Value>, StorageError> {
    Ok(text.map(|t| serde_json::from_str(&t)).transpose()?)
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub password_hash: String,
    pub created_at: i64,
}

impl UserRow {
    pub fn into_user(self) -> Result<(User, String), StorageError> {
        let user = User {
            id: uuid(&self.id)?,
            email: self.email,
            username: self.username,
            name: self.name,
            image: self.image,
            bio: self.bio,
            created_at: timestamp(self.created_at)?,
        };
        Ok((user, self.password_hash))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SurveyRow {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: String,
    pub is_public: bool,
    pub share_type: String,
    pub allow_anon: bool,
    pub conversational: bool,
    pub max_responses: Option<u32>,
    pub closes_at: Option<i64>,
    pub published_at: Option<i64>,
    pub password_hash: Option<String>,
    pub ip_allowlist: String,
    pub response_count: u32,
    pub view_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub theme: Option<String>,
    pub locale: Option<String>,
    pub translations: Option<String>,
    pub thank_you_message: Option<String>,
    pub redirect_url: Option<String>,
    pub show_progress: bool,
    pub show_question_numbers: bool,
    pub shuffle_questions: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<SurveyRow> for Survey {
    type Error = StorageError;

    fn try_from(row: SurveyRow) -> Result<Self, Self::Error> {
        Ok(Survey {
            id: uuid(&row.id)?,
            author_id: uuid(&row.author_id)?,
            title: row.title,
            description: row.description,
            category: row.category.parse()?,
            status: row.status.parse()?,
            is_public: row.is_public,
            share_type: row.share_type.parse()?,
            allow_anon: row.allow_anon,
            conversational: row.conversational,
            max_responses: row.max_responses,
            closes_at: optional_timestamp(row.closes_at)?,
            published_at: optional_timestamp(row.published_at)?,
            password_hash: row.password_hash,
            ip_allowlist: serde_json::from_str(&row.ip_allowlist)?,
            response_count: row.response_count,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
            webhook_url: row.webhook_url,
            webhook_secret: row.webhook_secret,
            theme: optional_json(row.theme)?,
            locale: row.locale,
            translations: optional_json(row.translations)?,
            thank_you_message: row.thank_you_message,
            redirect_url: row.redirect_url,
            show_progress: row.show_progress,
            show_question_numbers: row.show_question_numbers,
            shuffle_questions: row.shuffle_questions,
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct QuestionRow {
    pub id: String,
    pub survey_id: String,
    #[sqlx(rename = "type")]
    pub question_type: String,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub options: Option<String>,
    pub sort_order: i32,
    pub page: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub placeholder: Option<String>,
    pub logic: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = StorageError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let options = row
            .options
            .map(|text| serde_json::from_str::<QuestionOptions>(&text))
            .transpose()?;
        let logic: Vec<SkipLogicRule> = serde_json::from_str(&row.logic)?;

        Ok(Question {
            id: uuid(&row.id)?,
            survey_id: uuid(&row.survey_id)?,
            question_type: row.question_type.parse()?,
            title: row.title,
            description: row.description,
            required: row.required,
            options,
            order: row.sort_order,
            page: row.page,
            min: row.min,
            max: row.max,
            placeholder: row.placeholder,
            logic,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ResponseRow {
    pub id: String,
    pub survey_id: String,
    pub respondent_id: Option<String>,
    pub is_complete: bool,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub duration: Option<u32>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub metadata: String,
}

impl TryFrom<ResponseRow> for Response {
    type Error = StorageError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let metadata: ResponseMetadata = serde_json::from_str(&row.metadata)?;
        Ok(Response {
            id: uuid(&row.id)?,
            survey_id: uuid(&row.survey_id)?,
            respondent_id: row.respondent_id.as_deref().map(uuid).transpose()?,
            is_complete: row.is_complete,
            started_at: timestamp(row.started_at)?,
            completed_at: optional_timestamp(row.completed_at)?,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            duration: row.duration,
            flagged: row.flagged,
            flag_reason: row.flag_reason,
            metadata,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AnswerRow {
    pub id: String,
    pub response_id: String,
    pub question_id: String,
    pub value: String,
    pub file_url: Option<String>,
    pub signature_url: Option<String>,
}

impl TryFrom<AnswerRow> for Answer {
    type Error = StorageError;

    fn try_from(row: AnswerRow) -> Result<Self, Self::Error> {
        Ok(Answer {
            id: uuid(&row.id)?,
            response_id: uuid(&row.response_id)?,
            question_id: uuid(&row.question_id)?,
            value: row.value,
            file_url: row.file_url,
            signature_url: row.signature_url,
        })
    }
}

/// A comment joined with its author's public profile.
#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    pub id: String,
    pub survey_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
    pub author_username: Option<String>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StorageError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: uuid(&row.id)?,
            survey_id: uuid(&row.survey_id)?,
            parent_id: row.parent_id.as_deref().map(uuid).transpose()?,
            content: row.content,
            author: CommentAuthor {
                id: uuid(&row.author_id)?,
                name: row.author_name,
                image: row.author_image,
                username: row.author_username,
            },
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}
