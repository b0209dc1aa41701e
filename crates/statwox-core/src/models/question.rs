use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::survey::text_enum;
use crate::error::CoreError;

/// A single question within a survey.
///
/// `order` is the sort key within the whole survey; `page` groups questions
/// for multi-page surveys.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub survey_id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    #[ts(type = "string[] | { rows: Array<string>, columns: Array<string> } | null")]
    pub options: Option<QuestionOptions>,
    pub order: i32,
    pub page: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub placeholder: Option<String>,
    /// Skip-logic rules, evaluated in list order; first match wins.
    #[serde(default)]
    pub logic: Vec<SkipLogicRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum QuestionType {
    ShortText,
    LongText,
    MultipleChoice,
    Checkbox,
    Rating,
    YesNo,
    Date,
    Email,
    PhoneNumber,
    Matrix,
    Likert,
    FileUpload,
}

text_enum!(QuestionType, "type", {
    ShortText => "shortText",
    LongText => "longText",
    MultipleChoice => "multipleChoice",
    Checkbox => "checkbox",
    Rating => "rating",
    YesNo => "yesNo",
    Date => "date",
    Email => "email",
    PhoneNumber => "phoneNumber",
    Matrix => "matrix",
    Likert => "likert",
    FileUpload => "fileUpload",
});

impl QuestionType {
    /// Free-text answer types whose analytics expose raw samples.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            QuestionType::ShortText
                | QuestionType::LongText
                | QuestionType::Email
                | QuestionType::PhoneNumber
        )
    }
}

/// Type-dependent option payload.
///
/// Choice types carry a flat list; matrix questions carry rows and columns.
/// Upstream callers sometimes send the payload double-encoded as a JSON
/// string, which is unwrapped on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptions", into = "RawOptions")]
pub enum QuestionOptions {
    Choices(Vec<String>),
    Matrix {
        rows: Vec<String>,
        columns: Vec<String>,
    },
}

impl QuestionOptions {
    /// The declared choices, or an empty slice for matrix options.
    pub fn choices(&self) -> &[String] {
        match self {
            QuestionOptions::Choices(choices) => choices,
            QuestionOptions::Matrix { .. } => &[],
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawOptions {
    Choices(Vec<String>),
    Matrix {
        rows: Vec<String>,
        columns: Vec<String>,
    },
    Encoded(String),
}

impl TryFrom<RawOptions> for QuestionOptions {
    type Error = CoreError;

    fn try_from(raw: RawOptions) -> Result<Self, Self::Error> {
        let raw = match raw {
            RawOptions::Encoded(text) => serde_json::from_str::<RawOptions>(&text)?,
            other => other,
        };
        match raw {
            RawOptions::Choices(choices) => Ok(QuestionOptions::Choices(choices)),
            RawOptions::Matrix { rows, columns } => Ok(QuestionOptions::Matrix { rows, columns }),
            RawOptions::Encoded(_) => Err(CoreError::InvalidOptions(
                "options are encoded more than once".to_string(),
            )),
        }
    }
}

impl From<QuestionOptions> for RawOptions {
    fn from(options: QuestionOptions) -> Self {
        match options {
            QuestionOptions::Choices(choices) => RawOptions::Choices(choices),
            QuestionOptions::Matrix { rows, columns } => RawOptions::Matrix { rows, columns },
        }
    }
}

/// A conditional jump attached to a question.
///
/// When `condition` holds for the question's answer, every question between
/// this one and `target_question_id` is hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SkipLogicRule {
    pub condition: Condition,
    #[serde(default)]
    pub value: String,
    pub target_question_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Condition {
    Equals,
    NotEquals,
    Contains,
    Gt,
    Lt,
    IsEmpty,
    IsNotEmpty,
}
