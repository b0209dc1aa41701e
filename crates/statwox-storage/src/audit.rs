use jiff::Timestamp;
use sqlx::SqlitePool;
use uuid::Uuid;

use statwox_audit::events::AuditEvent;

use crate::error::StorageError;
use crate::rows::micros;

/// Append `event` to the audit log.
pub async fn record(pool: &SqlitePool, event: &AuditEvent, now: Timestamp) -> Result<(), StorageError> {
    let metadata = event
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO audit_log
            (id, action, entity_type, entity_id, user_id, metadata, ip_address, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(event.action.as_str())
    .bind(event.entity_type.as_str())
    .bind(event.entity_id.to_string())
    .bind(event.user_id.to_string())
    .bind(metadata)
    .bind(&event.ip_address)
    .bind(micros(now))
    .execute(pool)
    .await?;

    Ok(())
}

/// Number of audit rows recorded for one entity.
pub async fn count_for_entity(pool: &SqlitePool, entity_id: Uuid) -> Result<u32, StorageError> {
    let n: u32 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE entity_id = ?")
        .bind(entity_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(n)
}
