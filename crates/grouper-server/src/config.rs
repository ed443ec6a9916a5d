//! Server configuration loaded from the environment.

use std::env;

use anyhow::Context;
use grouper_auth::AuthConfig;
use grouper_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Read `GROUPER_*` variables, falling back to the crate defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();

        let min_token_length = match env::var("GROUPER_MIN_TOKEN_LENGTH") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("GROUPER_MIN_TOKEN_LENGTH is not a number: {raw}"))?,
            Err(_) => auth_defaults.min_token_length,
        };

        Ok(Self {
            db: DbConfig {
                url: env::var("GROUPER_DB_URL").unwrap_or(db_defaults.url),
                namespace: env::var("GROUPER_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
                database: env::var("GROUPER_DB_DATABASE").unwrap_or(db_defaults.database),
                username: env::var("GROUPER_DB_USER").unwrap_or(db_defaults.username),
                password: env::var("GROUPER_DB_PASSWORD").unwrap_or(db_defaults.password),
            },
            auth: AuthConfig {
                token_pepper: env::var("GROUPER_TOKEN_PEPPER")
                    .ok()
                    .filter(|p| !p.is_empty()),
                min_token_length,
            },
        })
    }
}
