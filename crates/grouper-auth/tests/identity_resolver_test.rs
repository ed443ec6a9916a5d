//! Integration tests for access token resolution.

use chrono::{Duration, Utc};
use grouper_auth::config::AuthConfig;
use grouper_auth::resolver::IdentityResolver;
use grouper_auth::token;
use grouper_core::error::GrouperError;
use grouper_core::identity::Identity;
use grouper_core::models::access_token::CreateAccessToken;
use grouper_core::models::user::CreateUser;
use grouper_core::repository::{AccessTokenRepository, UserRepository};
use grouper_db::repository::{SurrealAccessTokenRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Resolver = IdentityResolver<SurrealAccessTokenRepository<Db>, SurrealUserRepository<Db>>;

/// Spin up in-memory DB, run migrations, create one user.
async fn setup(config: AuthConfig) -> (Resolver, Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    grouper_db::run_migrations(&db).await.unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            username: "alice".into(),
            is_system_admin: false,
        })
        .await
        .unwrap();

    let resolver = IdentityResolver::new(
        SurrealAccessTokenRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        config,
    );

    (resolver, db, user.id)
}

/// Store a fresh token for `user_id` and return the raw value.
async fn store_token(
    db: &Surreal<Db>,
    user_id: Uuid,
    config: &AuthConfig,
    expires_at: Option<chrono::DateTime<Utc>>,
) -> String {
    let raw = token::generate_access_token();
    SurrealAccessTokenRepository::new(db.clone())
        .create(CreateAccessToken {
            user_id,
            token_hash: token::hash_access_token(&raw, config.token_pepper.as_deref()),
            expires_at,
        })
        .await
        .unwrap();
    raw
}

#[tokio::test]
async fn valid_token_resolves_to_user() {
    let config = AuthConfig::default();
    let (resolver, db, user_id) = setup(config.clone()).await;
    let raw = store_token(&db, user_id, &config, Some(Utc::now() + Duration::hours(1))).await;

    match resolver.resolve(Some(&raw)).await.unwrap() {
        Identity::Authenticated(user) => {
            assert_eq!(user.id, user_id);
            assert_eq!(user.username, "alice");
        }
        Identity::Anonymous => panic!("expected authenticated identity"),
    }
}

#[tokio::test]
async fn missing_and_unknown_tokens_are_anonymous() {
    let (resolver, _db, _) = setup(AuthConfig::default()).await;

    for token in [None, Some(""), Some("foo"), Some("x".repeat(43).as_str())] {
        let identity = resolver.resolve(token).await.unwrap();
        assert!(!identity.is_authenticated(), "{token:?}");
    }
}

#[tokio::test]
async fn expired_token_is_anonymous() {
    let config = AuthConfig::default();
    let (resolver, db, user_id) = setup(config.clone()).await;
    let raw = store_token(&db, user_id, &config, Some(Utc::now() - Duration::seconds(1))).await;

    assert!(!resolver.resolve(Some(&raw)).await.unwrap().is_authenticated());

    let err = resolver.require_user(Some(&raw)).await.unwrap_err();
    assert!(matches!(err, GrouperError::Unauthenticated { ref reason } if reason.contains("expired")));
}

#[tokio::test]
async fn pepper_must_match() {
    let stored_with = AuthConfig {
        token_pepper: Some("pepper!".into()),
        ..Default::default()
    };
    let (resolver, db, user_id) = setup(AuthConfig::default()).await;
    let raw = store_token(&db, user_id, &stored_with, None).await;

    assert!(!resolver.resolve(Some(&raw)).await.unwrap().is_authenticated());
}

#[tokio::test]
async fn token_of_deleted_user_is_anonymous() {
    let config = AuthConfig::default();
    let (resolver, db, _) = setup(config.clone()).await;
    let raw = store_token(&db, Uuid::new_v4(), &config, None).await;

    assert!(!resolver.resolve(Some(&raw)).await.unwrap().is_authenticated());
}

#[tokio::test]
async fn require_user_reports_missing_token() {
    let (resolver, _db, _) = setup(AuthConfig::default()).await;

    let err = resolver.require_user(None).await.unwrap_err();
    assert!(matches!(err, GrouperError::Unauthenticated { .. }));
}
