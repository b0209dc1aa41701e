use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// A survey, poll, form, or quiz owned by exactly one author.
///
/// `response_count`, `view_count`, `like_count` and `comment_count` are
/// denormalized counters maintained alongside the child rows they count.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Survey {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: SurveyCategory,
    pub status: SurveyStatus,
    pub is_public: bool,
    pub share_type: ShareType,
    pub allow_anon: bool,
    pub conversational: bool,
    pub max_responses: Option<u32>,
    pub closes_at: Option<jiff::Timestamp>,
    pub published_at: Option<jiff::Timestamp>,
    /// bcrypt hash of the access password. Never serialized.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub ip_allowlist: Vec<String>,
    pub response_count: u32,
    pub view_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
    pub webhook_url: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub webhook_secret: Option<String>,
    pub theme: Option<serde_json::Value>,
    pub locale: Option<String>,
    pub translations: Option<serde_json::Value>,
    pub thank_you_message: Option<String>,
    pub redirect_url: Option<String>,
    pub show_progress: bool,
    pub show_question_numbers: bool,
    pub shuffle_questions: bool,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Survey {
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// True once `closes_at` lies strictly before `now`.
    pub fn is_closed_at(&self, now: jiff::Timestamp) -> bool {
        self.closes_at.is_some_and(|closes_at| now > closes_at)
    }

    pub fn quota_reached(&self) -> bool {
        self.max_responses
            .is_some_and(|max| self.response_count >= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum SurveyStatus {
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ShareType {
    Public,
    Private,
    Community,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum SurveyCategory {
    Survey,
    Form,
    Poll,
    Quiz,
}

macro_rules! text_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CoreError::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

text_enum!(SurveyStatus, "status", {
    Draft => "draft",
    Published => "published",
    Closed => "closed",
});

text_enum!(ShareType, "shareType", {
    Public => "public",
    Private => "private",
    Community => "community",
    Link => "link",
});

text_enum!(SurveyCategory, "category", {
    Survey => "survey",
    Form => "form",
    Poll => "poll",
    Quiz => "quiz",
});
