//! Opaque access token generation and hashing.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random opaque access token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_access_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw access token, hex-encoded.
///
/// This is the value stored as `access_token.token_hash`. If a pepper
/// is configured it is prepended to the token before hashing.
pub fn hash_access_token(raw: &str, pepper: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    if let Some(p) = pepper {
        hasher.update(p.as_bytes());
    }
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
