use axum::Json;
use serde::Serialize;

/// Success body shared by every JSON endpoint: `{success, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: None,
        data: Some(data),
    })
}

pub fn ok_with_message<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data: Some(data),
    })
}

/// Success with a message and no data.
pub fn done(message: &'static str) -> Json<Envelope<()>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data: None,
    })
}
