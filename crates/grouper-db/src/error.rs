//! Database-specific error types and conversions.

use grouper_core::error::GrouperError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}: {detail}")]
    UniqueViolation { entity: String, detail: String },

    #[error("Write conflict: {0}")]
    WriteConflict(String),

    #[error("Malformed row: {0}")]
    Decode(String),
}

/// SurrealDB reports an index violation as
/// "Database index `idx_…` already contains …".
const UNIQUE_VIOLATION_MARKER: &str = "already contains";

/// SurrealDB reports an aborted optimistic transaction as
/// "Failed to commit transaction due to a read or write conflict. This
/// transaction can be retried".
const WRITE_CONFLICT_MARKERS: &[&str] = &["can be retried", "write conflict"];

#[derive(Debug, PartialEq, Eq)]
enum StatementFailure {
    UniqueViolation,
    WriteConflict,
    Other,
}

fn classify(detail: &str) -> StatementFailure {
    if detail.contains(UNIQUE_VIOLATION_MARKER) {
        StatementFailure::UniqueViolation
    } else if WRITE_CONFLICT_MARKERS.iter().any(|m| detail.contains(m)) {
        StatementFailure::WriteConflict
    } else {
        StatementFailure::Other
    }
}

impl DbError {
    /// Classify a failed statement. Unique index violations and
    /// retryable transaction conflicts get their own variants; anything
    /// else stays a plain SurrealDB error.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        match classify(&detail) {
            StatementFailure::UniqueViolation => DbError::UniqueViolation {
                entity: entity.into(),
                detail,
            },
            StatementFailure::WriteConflict => DbError::WriteConflict(detail),
            StatementFailure::Other => DbError::Surreal(err),
        }
    }
}

impl From<DbError> for GrouperError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GrouperError::NotFound { entity, id },
            DbError::UniqueViolation { entity, .. } => GrouperError::AlreadyExists { entity },
            other => GrouperError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_violation_is_unique_violation() {
        let detail = "Database index `idx_group_name` already contains 'jumbo', \
                      with record `group:⟨7b0b6b1e⟩`";
        assert_eq!(classify(detail), StatementFailure::UniqueViolation);
    }

    #[test]
    fn retryable_commit_failure_is_write_conflict() {
        let detail = "Failed to commit transaction due to a read or write conflict. \
                      This transaction can be retried";
        assert_eq!(classify(detail), StatementFailure::WriteConflict);
    }

    #[test]
    fn other_failures_stay_generic() {
        let detail = "Found 'x' for field `name`, with record `group:1`, \
                      but field must conform to: string::len(string::trim($value)) > 0";
        assert_eq!(classify(detail), StatementFailure::Other);
    }

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let err: GrouperError = DbError::UniqueViolation {
            entity: "group".into(),
            detail: "already contains".into(),
        }
        .into();
        assert!(matches!(err, GrouperError::AlreadyExists { ref entity } if entity == "group"));
    }
}
