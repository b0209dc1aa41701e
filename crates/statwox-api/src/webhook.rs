//! Outbound webhooks for survey events.
//!
//! Each delivery is a JSON `POST` carrying the event name and timestamp in
//! headers. When the survey has a secret, the body is signed with
//! HMAC-SHA256 and the hex digest sent as `X-StatWoX-Signature`, so the
//! receiver can recompute it over the raw body.

use std::time::Duration;

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_HEADER: &str = "X-StatWoX-Event";
pub const TIMESTAMP_HEADER: &str = "X-StatWoX-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-StatWoX-Signature";

const BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid signing secret: {0}")]
    Secret(#[from] hmac::digest::InvalidLength),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("delivery to {url} failed after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WebhookEvent {
    #[serde(rename = "response.created")]
    ResponseCreated,
    #[serde(rename = "survey.published")]
    SurveyPublished,
    #[serde(rename = "survey.closed")]
    SurveyClosed,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::ResponseCreated => "response.created",
            WebhookEvent::SurveyPublished => "survey.published",
            WebhookEvent::SurveyClosed => "survey.closed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event: WebhookEvent,
    pub survey_id: Uuid,
    pub data: Value,
    pub timestamp: Timestamp,
}

impl WebhookPayload {
    pub fn new(event: WebhookEvent, survey_id: Uuid, data: Value) -> Self {
        Self {
            event,
            survey_id,
            data,
            timestamp: Timestamp::now(),
        }
    }
}

/// Delivers payloads with bounded retries.
///
/// Attempt `n` that fails (transport error, timeout or non-2xx status) is
/// followed by a pause of `base_delay * 2^(n-1)` before the next one.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    max_attempts: u32,
    timeout: Duration,
    base_delay: Duration,
}

impl WebhookDispatcher {
    pub fn new(max_attempts: u32, timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("statwox-webhook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, max_attempts, timeout))
    }

    pub fn with_client(client: reqwest::Client, max_attempts: u32, timeout: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            timeout,
            base_delay: BASE_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Deliver in the background. The outcome is only logged.
    pub fn dispatch(&self, url: String, secret: Option<String>, payload: WebhookPayload) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver(&url, secret.as_deref(), &payload).await {
                error!(
                    url = %url,
                    event = payload.event.as_str(),
                    survey_id = %payload.survey_id,
                    error = %e,
                    "webhook delivery failed"
                );
            }
        });
    }

    /// Deliver and wait for the outcome. Returns the attempt that succeeded.
    pub async fn deliver(
        &self,
        url: &str,
        secret: Option<&str>,
        payload: &WebhookPayload,
    ) -> Result<u32, WebhookError> {
        let body = serde_json::to_vec(payload)?;
        let signature = secret.map(|s| sign_payload(s, &body)).transpose()?;
        let timestamp = payload.timestamp.to_string();

        for attempt in 1..=self.max_attempts {
            let mut request = self
                .client
                .post(url)
                .timeout(self.timeout)
                .header(CONTENT_TYPE, "application/json")
                .header(EVENT_HEADER, payload.event.as_str())
                .header(TIMESTAMP_HEADER, timestamp.as_str())
                .body(body.clone());
            if let Some(signature) = &signature {
                request = request.header(SIGNATURE_HEADER, signature.as_str());
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!(url, attempt, event = payload.event.as_str(), "webhook delivered");
                    return Ok(attempt);
                }
                Ok(response) => {
                    warn!(url, attempt, status = response.status().as_u16(), "webhook attempt rejected");
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "webhook attempt failed");
                }
            }

            if attempt < self.max_attempts {
                let delay = self.backoff(attempt);
                debug!(?delay, "waiting before webhook retry");
                tokio::time::sleep(delay).await;
            }
        }

        Err(WebhookError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Pause after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Hex-encoded HMAC-SHA256 of `body` under `secret`.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
