//! Authentication error types.

use grouper_core::error::GrouperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("access token missing")]
    TokenMissing,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token has expired")]
    TokenExpired,
}

impl From<AuthError> for GrouperError {
    fn from(err: AuthError) -> Self {
        GrouperError::Unauthenticated {
            reason: err.to_string(),
        }
    }
}
