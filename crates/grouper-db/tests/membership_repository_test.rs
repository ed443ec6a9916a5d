//! Integration tests for Membership repository using in-memory SurrealDB.

use chrono::NaiveDate;
use grouper_core::error::GrouperError;
use grouper_core::models::group::CreateGroup;
use grouper_core::models::membership::UpsertMembership;
use grouper_core::models::user::CreateUser;
use grouper_core::repository::{
    GroupRepository, MembershipRepository, Pagination, UserRepository,
};
use grouper_db::repository::{
    SurrealGroupRepository, SurrealMembershipRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create one group and
/// two users.
async fn setup() -> (
    SurrealMembershipRepository<surrealdb::engine::local::Db>,
    Uuid, // group_id
    Uuid, // user_a_id
    Uuid, // user_b_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    grouper_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let alice = users
        .create(CreateUser {
            username: "alice".into(),
            is_system_admin: false,
        })
        .await
        .unwrap();
    let bob = users
        .create(CreateUser {
            username: "bob".into(),
            is_system_admin: false,
        })
        .await
        .unwrap();

    let group = SurrealGroupRepository::new(db.clone())
        .create(CreateGroup {
            name: "Team".into(),
        })
        .await
        .unwrap();

    (
        SurrealMembershipRepository::new(db),
        group.id,
        alice.id,
        bob.id,
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn new_membership_defaults() {
    let (repo, group_id, alice, _) = setup().await;

    let m = repo
        .upsert(UpsertMembership {
            group_id,
            user_id: alice,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(m.group_id, group_id);
    assert_eq!(m.user_id, alice);
    assert!(!m.is_group_admin);
    assert_eq!(m.expiration_date, None);
}

#[tokio::test]
async fn expiration_date_round_trips_without_drift() {
    let (repo, group_id, alice, _) = setup().await;

    repo.upsert(UpsertMembership {
        group_id,
        user_id: alice,
        expiration_date: Some(Some(date(2019, 10, 10))),
        ..Default::default()
    })
    .await
    .unwrap();

    let stored = repo.get(group_id, alice).await.unwrap();
    assert_eq!(stored.expiration_date, Some(date(2019, 10, 10)));
}

#[tokio::test]
async fn upsert_updates_in_place() {
    let (repo, group_id, alice, _) = setup().await;

    repo.upsert(UpsertMembership {
        group_id,
        user_id: alice,
        is_group_admin: Some(true),
        expiration_date: Some(Some(date(2019, 10, 10))),
    })
    .await
    .unwrap();

    // Re-adding with a new date keeps the admin flag.
    let updated = repo
        .upsert(UpsertMembership {
            group_id,
            user_id: alice,
            is_group_admin: None,
            expiration_date: Some(Some(date(2020, 1, 1))),
        })
        .await
        .unwrap();
    assert!(updated.is_group_admin);
    assert_eq!(updated.expiration_date, Some(date(2020, 1, 1)));

    // Clearing the date.
    let cleared = repo
        .upsert(UpsertMembership {
            group_id,
            user_id: alice,
            is_group_admin: None,
            expiration_date: Some(None),
        })
        .await
        .unwrap();
    assert_eq!(cleared.expiration_date, None);

    let page = repo.list_by_group(group_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1, "pair must never be duplicated");
}

#[tokio::test]
async fn concurrent_upserts_converge_to_one_row() {
    let (repo, group_id, alice, _) = setup().await;

    let upsert = |day: u32| {
        repo.upsert(UpsertMembership {
            group_id,
            user_id: alice,
            expiration_date: Some(Some(date(2019, 10, day))),
            ..Default::default()
        })
    };

    let (a, b, c) = tokio::join!(upsert(1), upsert(2), upsert(3));
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    let page = repo.list_by_group(group_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn list_and_remove_members() {
    let (repo, group_id, alice, bob) = setup().await;

    for user_id in [alice, bob] {
        repo.upsert(UpsertMembership {
            group_id,
            user_id,
            ..Default::default()
        })
        .await
        .unwrap();
    }

    let page = repo.list_by_group(group_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);

    repo.remove(group_id, alice).await.unwrap();
    // Removing again is a no-op.
    repo.remove(group_id, alice).await.unwrap();

    let page = repo.list_by_group(group_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].user_id, bob);

    assert!(matches!(
        repo.get(group_id, alice).await,
        Err(GrouperError::NotFound { .. })
    ));
    assert_eq!(repo.list_by_user(bob).await.unwrap().len(), 1);
}
