//! SurrealDB repository implementations.

mod access_token;
mod group;
mod membership;
mod user;

use surrealdb_types::SurrealValue;

pub use access_token::SurrealAccessTokenRepository;
pub use group::SurrealGroupRepository;
pub use membership::SurrealMembershipRepository;
pub use user::SurrealUserRepository;

/// Retry budget for statements the store aborts with a retryable
/// transaction conflict.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}
