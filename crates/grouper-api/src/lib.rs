//! Grouper API: the request boundary.
//!
//! [`GroupApi`] takes raw request inputs (access token, path and body
//! parameters), resolves the caller, dispatches to the services and
//! renders the outcome as an [`ApiResponse`]. Listening, routing and
//! TLS belong to whatever transport embeds it.

mod handlers;
mod response;

pub use handlers::{AddUserRequest, CreateGroupRequest, GroupApi, SetGroupAdminRequest};
pub use response::{ApiResponse, GROUP_ALREADY_EXIST};
