//! Grouper Auth: resolves opaque access tokens to an [`Identity`].
//!
//! Token issuance is handled elsewhere; this crate only hashes a
//! presented token, looks it up and loads the owning user.
//!
//! [`Identity`]: grouper_core::identity::Identity

pub mod config;
pub mod error;
pub mod resolver;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use resolver::IdentityResolver;
