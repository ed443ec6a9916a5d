//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups of a single record
//! return [`GrouperError::NotFound`](crate::error::GrouperError::NotFound)
//! when nothing matches; uniqueness violations surface as
//! [`GrouperError::AlreadyExists`](crate::error::GrouperError::AlreadyExists).

use uuid::Uuid;

use crate::error::GrouperResult;
use crate::models::{
    access_token::{AccessToken, CreateAccessToken},
    group::{CreateGroup, Group},
    membership::{Membership, UpsertMembership},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GrouperResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrouperResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = GrouperResult<User>> + Send;
    /// The only mutation the membership core performs on a user.
    fn set_system_admin(
        &self,
        id: Uuid,
        is_system_admin: bool,
    ) -> impl Future<Output = GrouperResult<User>> + Send;
}

pub trait GroupRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the name is taken.
    fn create(&self, input: CreateGroup) -> impl Future<Output = GrouperResult<Group>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrouperResult<Group>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = GrouperResult<Group>> + Send;
    /// Deletes the group together with all of its memberships.
    fn delete(&self, id: Uuid) -> impl Future<Output = GrouperResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = GrouperResult<PaginatedResult<Group>>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    /// Create the membership or update it in place. Concurrent upserts
    /// for the same pair converge to a single row.
    fn upsert(
        &self,
        input: UpsertMembership,
    ) -> impl Future<Output = GrouperResult<Membership>> + Send;
    fn get(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = GrouperResult<Membership>> + Send;
    /// Removing a non-member is not an error.
    fn remove(&self, group_id: Uuid, user_id: Uuid)
    -> impl Future<Output = GrouperResult<()>> + Send;
    fn list_by_group(
        &self,
        group_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = GrouperResult<PaginatedResult<Membership>>> + Send;
    fn list_by_user(&self, user_id: Uuid)
    -> impl Future<Output = GrouperResult<Vec<Membership>>> + Send;
}

pub trait AccessTokenRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAccessToken,
    ) -> impl Future<Output = GrouperResult<AccessToken>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = GrouperResult<AccessToken>> + Send;
}
