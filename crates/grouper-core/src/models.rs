//! Domain models for Grouper.

pub mod access_token;
pub mod group;
pub mod membership;
pub mod user;
