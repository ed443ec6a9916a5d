//! Access token → [`Identity`] resolution.

use chrono::Utc;
use grouper_core::error::{GrouperError, GrouperResult};
use grouper_core::identity::Identity;
use grouper_core::models::access_token::AccessToken;
use grouper_core::models::user::User;
use grouper_core::repository::{AccessTokenRepository, UserRepository};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Identity resolver.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct IdentityResolver<T: AccessTokenRepository, U: UserRepository> {
    token_repo: T,
    user_repo: U,
    config: AuthConfig,
}

impl<T: AccessTokenRepository, U: UserRepository> IdentityResolver<T, U> {
    pub fn new(token_repo: T, user_repo: U, config: AuthConfig) -> Self {
        Self {
            token_repo,
            user_repo,
            config,
        }
    }

    /// Resolve a presented token to the user it belongs to.
    ///
    /// Missing, unknown, expired or orphaned tokens all yield
    /// [`Identity::Anonymous`]; only store failures are errors.
    pub async fn resolve(&self, raw_token: Option<&str>) -> GrouperResult<Identity> {
        match self.authenticate(raw_token).await {
            Ok(user) => Ok(Identity::Authenticated(user)),
            Err(Rejection::Auth(reason)) => {
                debug!(%reason, "Access token rejected");
                Ok(Identity::Anonymous)
            }
            Err(Rejection::Store(err)) => Err(err),
        }
    }

    /// Like [`resolve`](Self::resolve) but surfaces the rejection
    /// reason as `Unauthenticated`.
    pub async fn require_user(&self, raw_token: Option<&str>) -> GrouperResult<User> {
        self.authenticate(raw_token).await.map_err(|r| match r {
            Rejection::Auth(reason) => reason.into(),
            Rejection::Store(err) => err,
        })
    }

    async fn authenticate(&self, raw_token: Option<&str>) -> Result<User, Rejection> {
        let raw = raw_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        if raw.len() < self.config.min_token_length {
            return Err(AuthError::TokenInvalid("token too short".into()).into());
        }

        let hash = token::hash_access_token(raw, self.config.token_pepper.as_deref());
        let stored: AccessToken = self
            .token_repo
            .get_by_token_hash(&hash)
            .await
            .map_err(|e| match e {
                GrouperError::NotFound { .. } => {
                    Rejection::Auth(AuthError::TokenInvalid("unknown token".into()))
                }
                other => Rejection::Store(other),
            })?;

        if stored.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired.into());
        }

        self.user_repo
            .get_by_id(stored.user_id)
            .await
            .map_err(|e| match e {
                GrouperError::NotFound { .. } => {
                    Rejection::Auth(AuthError::TokenInvalid("token owner no longer exists".into()))
                }
                other => Rejection::Store(other),
            })
    }
}

enum Rejection {
    Auth(AuthError),
    Store(GrouperError),
}

impl From<AuthError> for Rejection {
    fn from(err: AuthError) -> Self {
        Rejection::Auth(err)
    }
}
