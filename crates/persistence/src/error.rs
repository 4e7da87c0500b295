// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ferry_book::CoreError;
use ferry_book_domain::DomainError;
use thiserror::Error;

/// Failures of the persistence adapter.
///
/// Rule rejections from the core crate travel through unchanged as
/// [`PersistenceError::Rejected`] so the API can name the rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Initialization error: {0}")]
    InitializationError(String),
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    #[error("Not found: {0}")]
    NotFound(String),
    /// Another writer held the database lock for every retry.
    #[error("Concurrent update conflict: {0}")]
    ConcurrencyConflict(String),
    /// The unit of work was rolled back; nothing was written.
    #[error("{0}")]
    Rejected(#[from] CoreError),
    /// Stored text that does not decode into its domain type.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

impl PersistenceError {
    /// Returns true for lock contention that is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }

    pub(crate) fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.into(),
        }
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => {
                let message: String = err.to_string();
                // SQLITE_BUSY and SQLITE_LOCKED both surface with these texts.
                if message.contains("database is locked")
                    || message.contains("database table is locked")
                    || message.contains("database is busy")
                {
                    Self::ConcurrencyConflict(message)
                } else {
                    Self::DatabaseError(message)
                }
            }
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::Rejected(CoreError::DomainViolation(err))
    }
}
