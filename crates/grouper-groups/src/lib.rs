//! Grouper Groups: authorization engine, group lifecycle and
//! membership services.
//!
//! Services are generic over the `grouper-core` repository traits and
//! receive the caller as an [`Identity`](grouper_core::identity::Identity).
//! They report typed outcomes only; mapping to a transport is the
//! caller's job.

pub mod authz;
mod ids;
pub mod lifecycle;
pub mod membership;

pub use authz::{GroupAccess, can_create_group, can_manage_group};
pub use lifecycle::GroupService;
pub use membership::{AddUserToGroup, MembershipService};
