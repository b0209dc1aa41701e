use jiff::Timestamp;
use tracing::warn;

use statwox_audit::events::AuditEvent;
use statwox_storage::audit;

use crate::state::AppState;

/// Emit `event` and persist it. A failed write is logged and dropped; it
/// never fails the operation being audited.
pub async fn record(state: &AppState, event: AuditEvent) {
    event.emit();

    if let Err(e) = audit::record(&state.pool, &event, Timestamp::now()).await {
        warn!(
            action = event.action.as_str(),
            entity_id = %event.entity_id,
            error = %e,
            "failed to persist audit event"
        );
    }
}
