//! SurrealDB implementation of [`MembershipRepository`].
//!
//! Each membership lives at the deterministic record key
//! `membership:<group_id>_<user_id>` and is written with `UPSERT`, so a
//! pair can never produce two rows no matter how writes interleave.

use chrono::{DateTime, NaiveDate, Utc};
use grouper_core::error::GrouperResult;
use grouper_core::models::membership::{
    EXPIRATION_DATE_FORMAT, Membership, UpsertMembership, format_expiration_date,
};
use grouper_core::repository::{MembershipRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, MAX_WRITE_ATTEMPTS};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    group_id: String,
    user_id: String,
    is_group_admin: bool,
    expiration_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let group_id = Uuid::parse_str(&self.group_id)
            .map_err(|e| DbError::Decode(format!("invalid group UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        let expiration_date = self
            .expiration_date
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, EXPIRATION_DATE_FORMAT)
                    .map_err(|e| DbError::Decode(format!("invalid expiration_date '{raw}': {e}")))
            })
            .transpose()?;
        Ok(Membership {
            group_id,
            user_id,
            is_group_admin: self.is_group_admin,
            expiration_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn record_key(group_id: Uuid, user_id: Uuid) -> String {
    format!("{group_id}_{user_id}")
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn try_upsert(&self, input: &UpsertMembership) -> Result<Membership, DbError> {
        let key = record_key(input.group_id, input.user_id);

        // Fields left out of SET keep their stored value, or take the
        // schema default on first insert.
        let mut sets = vec!["group_id = $group_id", "user_id = $user_id"];
        if input.is_group_admin.is_some() {
            sets.push("is_group_admin = $is_group_admin");
        }
        if input.expiration_date.is_some() {
            sets.push("expiration_date = $expiration_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPSERT type::record('membership', $key) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("key", key.clone()))
            .bind(("group_id", input.group_id.to_string()))
            .bind(("user_id", input.user_id.to_string()));

        if let Some(is_group_admin) = input.is_group_admin {
            builder = builder.bind(("is_group_admin", is_group_admin));
        }
        if let Some(expiration_date) = input.expiration_date {
            builder = builder.bind((
                "expiration_date",
                expiration_date.map(format_expiration_date),
            ));
        }

        let result = builder.await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        let rows: Vec<MembershipRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: key,
        })?;

        row.try_into_membership()
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn upsert(&self, input: UpsertMembership) -> GrouperResult<Membership> {
        let mut attempt = 1;

        loop {
            match self.try_upsert(&input).await {
                Err(DbError::WriteConflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(attempt, %reason, "Retrying membership upsert after write conflict");
                    attempt += 1;
                }
                result => return result.map_err(Into::into),
            }
        }
    }

    async fn get(&self, group_id: Uuid, user_id: Uuid) -> GrouperResult<Membership> {
        let key = record_key(group_id, user_id);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('membership', $key)")
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: key,
        })?;

        row.try_into_membership().map_err(Into::into)
    }

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> GrouperResult<()> {
        self.db
            .query("DELETE type::record('membership', $key)")
            .bind(("key", record_key(group_id, user_id)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        Ok(())
    }

    async fn list_by_group(
        &self,
        group_id: Uuid,
        pagination: Pagination,
    ) -> GrouperResult<PaginatedResult<Membership>> {
        let group_id_str = group_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE group_id = $group_id GROUP ALL",
            )
            .bind(("group_id", group_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT * FROM membership \
                 WHERE group_id = $group_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("group_id", group_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_membership())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> GrouperResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM membership \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_membership())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
