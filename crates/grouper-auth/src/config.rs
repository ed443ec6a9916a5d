//! Authentication configuration.

/// Configuration for access token resolution.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional server-side pepper mixed into token hashes. Must match
    /// the pepper used when the tokens were stored.
    pub token_pepper: Option<String>,
    /// Tokens shorter than this are rejected without a store lookup
    /// (default: 16).
    pub min_token_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_pepper: None,
            min_token_length: 16,
        }
    }
}
