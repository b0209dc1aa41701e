use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::answer::Answer;

/// One respondent's submission to a survey.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Response {
    pub id: Uuid,
    pub survey_id: Uuid,
    /// `None` for anonymous submissions.
    pub respondent_id: Option<Uuid>,
    pub is_complete: bool,
    pub started_at: jiff::Timestamp,
    pub completed_at: Option<jiff::Timestamp>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Client-reported completion time in seconds.
    pub duration: Option<u32>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

/// Client-supplied context stored alongside a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResponseMetadata {
    pub geolocation: Option<serde_json::Value>,
    pub device_type: Option<String>,
    pub locale: Option<String>,
}

/// A response together with its answers, as read for analytics and export.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub response: Response,
    pub answers: Vec<Answer>,
}

impl ResponseRecord {
    /// The first answer recorded for `question_id`, if any.
    pub fn answer_for(&self, question_id: Uuid) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }
}
