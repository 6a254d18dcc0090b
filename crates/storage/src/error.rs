use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The live schema lacks a column the statement referenced (SQLSTATE 42703).
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const UNDEFINED_COLUMN: &str = "42703";

impl StorageError {
    /// Maps a raw sqlx error onto the variants callers branch on.
    pub fn classify(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(e) if e.code().as_deref() == Some(UNDEFINED_COLUMN) => {
                StorageError::MissingColumn(e.message().to_string())
            }
            _ => StorageError::Database(error),
        }
    }

    pub fn is_missing_column(&self) -> bool {
        match self {
            StorageError::MissingColumn(_) => true,
            StorageError::Database(sqlx::Error::Database(e)) => {
                e.code().as_deref() == Some(UNDEFINED_COLUMN)
            }
            _ => false,
        }
    }

    /// Connectivity and configuration failures, as opposed to rejected statements.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            StorageError::Database(
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
                    | sqlx::Error::Configuration(_)
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_variant_is_detected() {
        let error = StorageError::MissingColumn("series_detail".to_string());
        assert!(error.is_missing_column());
        assert!(!error.is_connection_error());
    }

    #[test]
    fn test_other_errors_are_not_missing_column() {
        assert!(!StorageError::ConstraintViolation("x".to_string()).is_missing_column());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_missing_column());
    }

    #[test]
    fn test_pool_errors_are_connection_errors() {
        assert!(StorageError::Database(sqlx::Error::PoolTimedOut).is_connection_error());
        assert!(StorageError::Database(sqlx::Error::PoolClosed).is_connection_error());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_connection_error());
    }

    #[test]
    fn test_classify_keeps_non_database_errors() {
        let error = StorageError::classify(sqlx::Error::RowNotFound);
        assert!(matches!(error, StorageError::Database(sqlx::Error::RowNotFound)));
    }
}
