use serde_json::Value;
use uuid::Uuid;

/// Real-time fan-out to connected clients.
///
/// Publishing is fire-and-forget: implementations swallow their own
/// failures so a caller never fails because nobody was listening.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, channel: &str, event: &str, payload: &Value);
}

/// Channel carrying live updates for one survey.
pub fn survey_channel(survey_id: Uuid) -> String {
    format!("survey-{survey_id}")
}

/// Channel carrying one user's personal notifications.
pub fn user_channel(user_id: Uuid) -> String {
    format!("user-{user_id}-notifications")
}

/// Sink that records each publication as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, channel: &str, event: &str, payload: &Value) {
        tracing::info!(channel, event, payload = %payload, "notification published");
    }
}
