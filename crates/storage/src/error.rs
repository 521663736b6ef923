use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StorageError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StorageError::Validation(msg.into())
    }

    pub fn state_conflict(msg: impl Into<String>) -> Self {
        StorageError::StateConflict(msg.into())
    }
}
