use thiserror::Error;
use uuid::Uuid;

use statwox_core::error::CoreError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("survey {0} has reached its response limit")]
    QuotaExceeded(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid stored value: {0}")]
    Core(#[from] CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timestamp out of range: {0}")]
    Timestamp(#[from] jiff::Error),
}

impl StorageError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Error mapper turning a unique-constraint violation into
    /// [`StorageError::Duplicate`].
    pub(crate) fn on_unique(entity: &'static str) -> impl Fn(sqlx::Error) -> StorageError {
        move |e| {
            if let sqlx::Error::Database(db) = &e
                && db.is_unique_violation()
            {
                return StorageError::Duplicate(entity);
            }
            StorageError::Database(e)
        }
    }
}
