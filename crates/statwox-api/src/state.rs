use std::sync::Arc;

use jiff::SignedDuration;
use sqlx::SqlitePool;

use statwox_auth::jwt::TokenSigner;

use crate::config::Config;
use crate::notify::{NotificationSink, TracingSink};
use crate::webhook::WebhookDispatcher;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub signer: Arc<TokenSigner>,
    pub config: Arc<Config>,
    pub notifier: Arc<dyn NotificationSink>,
    pub webhooks: WebhookDispatcher,
}

impl AppState {
    /// State with the tracing notification sink and a webhook dispatcher
    /// built from `config`.
    pub fn new(pool: SqlitePool, config: Config) -> eyre::Result<Self> {
        let signer = TokenSigner::new(
            &config.jwt_secret,
            SignedDuration::from_hours(config.jwt_ttl_days.saturating_mul(24)),
        )?;
        let webhooks = WebhookDispatcher::new(config.webhook_max_attempts, config.webhook_timeout)?;

        Ok(Self {
            pool,
            signer: Arc::new(signer),
            config: Arc::new(config),
            notifier: Arc::new(TracingSink),
            webhooks,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }
}
