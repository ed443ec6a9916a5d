//! Error types for Grouper.
//!
//! Every variant except [`GrouperError::Database`] and
//! [`GrouperError::Internal`] is an expected outcome that callers branch
//! on. The two fatal variants cover store failures and broken
//! invariants.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GrouperError {
    #[error("Authentication required: {reason}")]
    Unauthenticated { reason: String },

    #[error("Authorization denied: {reason}")]
    Unauthorized { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid reference: {entity} with id {id} does not exist")]
    InvalidReference { entity: String, id: String },

    #[error("Group already exists: {name} ({id})")]
    GroupConflict { id: Uuid, name: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GrouperError {
    /// `true` for failures outside the expected outcome taxonomy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

pub type GrouperResult<T> = Result<T, GrouperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_and_internal_failures_are_fatal() {
        assert!(GrouperError::Database("down".into()).is_fatal());
        assert!(GrouperError::Internal("bug".into()).is_fatal());

        let expected = [
            GrouperError::Unauthenticated {
                reason: "no token".into(),
            },
            GrouperError::Unauthorized {
                reason: "not admin".into(),
            },
            GrouperError::NotFound {
                entity: "group".into(),
                id: "666".into(),
            },
            GrouperError::InvalidReference {
                entity: "user".into(),
                id: "rand".into(),
            },
            GrouperError::GroupConflict {
                id: Uuid::new_v4(),
                name: "jumbo".into(),
            },
            GrouperError::Validation {
                message: "name is required".into(),
            },
        ];
        assert!(expected.iter().all(|e| !e.is_fatal()));
    }
}
