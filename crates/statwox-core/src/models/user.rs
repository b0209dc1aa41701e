use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Public profile of an account. Credentials live only in storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_at: jiff::Timestamp,
}
