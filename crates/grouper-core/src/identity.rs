//! The caller identity every service operation receives.

use crate::error::GrouperError;
use crate::models::user::User;

/// Outcome of resolving an access token.
///
/// Services never assume a valid actor; they receive an `Identity` and
/// reject [`Identity::Anonymous`] before touching the store.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Authenticated(User),
}

impl Identity {
    /// The authenticated user, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<&User, GrouperError> {
        match self {
            Identity::Authenticated(user) => Ok(user),
            Identity::Anonymous => Err(GrouperError::Unauthenticated {
                reason: "missing or invalid access token".into(),
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity::Authenticated(user)
    }
}
