//! Integration tests for AccessToken repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use grouper_core::error::GrouperError;
use grouper_core::models::access_token::CreateAccessToken;
use grouper_core::models::user::CreateUser;
use grouper_core::repository::{AccessTokenRepository, UserRepository};
use grouper_db::repository::{SurrealAccessTokenRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (
    SurrealAccessTokenRepository<surrealdb::engine::local::Db>,
    Uuid, // user_id
) {
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

    (SurrealAccessTokenRepository::new(db), user.id)
}

#[tokio::test]
async fn create_and_lookup_by_hash() {
    let (repo, user_id) = setup().await;
    let expires_at = Utc::now() + Duration::hours(1);

    let token = repo
        .create(CreateAccessToken {
            user_id,
            token_hash: "deadbeef".into(),
            expires_at: Some(expires_at),
        })
        .await
        .unwrap();

    let found = repo.get_by_token_hash("deadbeef").await.unwrap();
    assert_eq!(found.id, token.id);
    assert_eq!(found.user_id, user_id);
    assert!(found.expires_at.is_some());
}

#[tokio::test]
async fn unknown_hash_is_not_found() {
    let (repo, _) = setup().await;
    assert!(matches!(
        repo.get_by_token_hash("missing").await,
        Err(GrouperError::NotFound { .. })
    ));
}
