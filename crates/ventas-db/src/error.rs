//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  SQLite Error (sqlx::Error)                                 │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  DbError (this module) ← adds context and categorization    │
//! │       │         ▲                                           │
//! │       │         └── CoreError (domain kinds) pass through   │
//! │       ▼             transparently via DbError::Domain       │
//! │  Boundary layer maps kinds to transport codes               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Engine operations return `DbResult<T>`: business outcomes surface
//! as `DbError::Domain(CoreError::…)`, infrastructure failures as the
//! other variants. A rollback failure is surfaced as
//! `TransactionFailed`, never swallowed.

use thiserror::Error;
use ventas_core::CoreError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain error from ventas-core. Transparent so callers can
    /// match on the business kind directly.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Unique constraint violation (duplicate identity number, ...).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction begin/commit/rollback failed.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a domain NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::Domain(CoreError::not_found(entity, id))
    }

    /// Returns the inner domain error, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(core) => Some(core),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → Domain(NotFound)
/// sqlx::Error::Database       → analyze message for constraint type;
///                               SQLITE_BUSY → Domain(Conflict)
/// sqlx::Error::PoolTimedOut   → PoolExhausted
/// Other                       → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::Domain(CoreError::NotFound {
                entity: "record",
                id: "unknown".to_string(),
            }),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") {
                    // SQLITE_BUSY: a concurrent transaction holds the
                    // write lock and our read snapshot can no longer be
                    // upgraded. The losing operation rolls back; the
                    // caller sees a domain kind, not a driver string.
                    DbError::Domain(CoreError::Conflict {
                        entity: "database",
                        id: "write lock".to_string(),
                    })
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_is_transparent() {
        let err: DbError = CoreError::AlreadySettled {
            sale_id: "s1".to_string(),
        }
        .into();

        assert_eq!(err.to_string(), "sale s1 is already settled");
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::AlreadySettled { .. })
        ));
    }
}
