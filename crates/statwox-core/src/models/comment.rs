use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// The public face of a comment's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub username: Option<String>,
}

/// A comment on a survey. Replies carry the ID of their top-level parent;
/// threads are one level deep.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub survey_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author: CommentAuthor,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// A top-level comment with its replies, oldest reply first.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Remove markup from user-written comment text.
///
/// Every `<` followed by at least one character other than `>` starts a tag
/// that runs through the next `>`, or to the end of the text when no `>`
/// follows. A bare `<` or `<>` is kept.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        match tail.chars().next() {
            None | Some('>') => {
                out.push('<');
                rest = tail;
            }
            Some(_) => match tail.find('>') {
                Some(end) => rest = &tail[end + 1..],
                None => rest = "",
            },
        }
    }
    out.push_str(rest);
    out
}
