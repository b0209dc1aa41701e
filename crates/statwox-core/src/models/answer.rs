use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A persisted answer. `value` is always text; callers stringify numeric,
/// boolean, and composite answers before storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Answer {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: Uuid,
    pub value: String,
    pub file_url: Option<String>,
    pub signature_url: Option<String>,
}

/// An answer as submitted by a respondent.
///
/// `question_id` stays unparsed so that an unknown or malformed ID can be
/// reported back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AnswerInput {
    pub question_id: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub signature_url: Option<String>,
}

impl AnswerInput {
    /// The stored text form of the submitted value.
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A validated answer ready to be persisted with its response.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub question_id: Uuid,
    pub value: String,
    pub file_url: Option<String>,
    pub signature_url: Option<String>,
}
