//! SurrealDB implementation of [`AccessTokenRepository`].

use chrono::{DateTime, Utc};
use grouper_core::error::GrouperResult;
use grouper_core::models::access_token::{AccessToken, CreateAccessToken};
use grouper_core::repository::AccessTokenRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AccessTokenRow {
    user_id: String,
    token_hash: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AccessTokenRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn row_to_token(row: AccessTokenRow, id: Uuid) -> Result<AccessToken, DbError> {
    let user_id = Uuid::parse_str(&row.user_id)
        .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
    Ok(AccessToken {
        id,
        user_id,
        token_hash: row.token_hash,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

impl AccessTokenRowWithId {
    fn try_into_token(self) -> Result<AccessToken, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid token UUID: {e}")))?;
        row_to_token(
            AccessTokenRow {
                user_id: self.user_id,
                token_hash: self.token_hash,
                expires_at: self.expires_at,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the AccessToken repository.
#[derive(Clone)]
pub struct SurrealAccessTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccessTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccessTokenRepository for SurrealAccessTokenRepository<C> {
    async fn create(&self, input: CreateAccessToken) -> GrouperResult<AccessToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('access_token', $id) SET \
                 user_id = $user_id, \
                 token_hash = $token_hash, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("access_token", e))?;

        let rows: Vec<AccessTokenRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "access_token".into(),
            id: id_str,
        })?;

        row_to_token(row, id).map_err(Into::into)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> GrouperResult<AccessToken> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM access_token \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccessTokenRowWithId> = result.take(0).map_err(DbError::from)?;
        // Never echo the hash back in errors.
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "access_token".into(),
            id: "<redacted>".into(),
        })?;

        row.try_into_token().map_err(Into::into)
    }
}
