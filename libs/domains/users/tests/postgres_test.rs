//! Repository tests against a real Postgres container.
//!
//! Run with `cargo test -p domain_users --test postgres_test -- --ignored`
//! (requires Docker).

use chrono::{Duration, Utc};
use domain_users::{AuthToken, PgTokenRepository, PgUserRepository, TokenRepository, User, UserError, UserRepository};
use test_utils::{TestDataBuilder, TestDatabase};

fn user(builder: &TestDataBuilder, i: usize, active: bool) -> User {
    let mut user = User::new(
        builder.username(i),
        builder.email(i),
        "hash".to_string(),
        format!("activation-{i}"),
    );
    user.active = active;
    user
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_and_find_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_create_find");

    let created = repo.create(user(&builder, 0, false)).await.unwrap();

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, builder.email(0));
    assert!(!by_id.active);

    let by_token = repo.find_by_activation_token("activation-0").await.unwrap().unwrap();
    assert_eq!(by_token.id, created.id);
    assert!(repo.email_exists(&builder.email(0)).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicate_email_is_a_field_error() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_duplicate");

    repo.create(user(&builder, 0, false)).await.unwrap();
    let mut duplicate = user(&builder, 1, false);
    duplicate.email = builder.email(0);

    match repo.create(duplicate).await {
        Err(UserError::Validation(fields)) => assert_eq!(fields.get("email"), Some("email_inuse")),
        other => panic!("expected email_inuse, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn active_listing_pages_and_excludes() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_listing");

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(repo.create(user(&builder, i, true)).await.unwrap().id);
    }
    repo.create(user(&builder, 9, false)).await.unwrap();

    assert_eq!(repo.count_active(None).await.unwrap(), 5);
    assert_eq!(repo.count_active(Some(ids[0])).await.unwrap(), 4);

    let page = repo.find_active(Some(ids[0]), 2, 2).await.unwrap();
    let page_ids: Vec<_> = page.iter().map(|u| u.id).collect();
    assert_eq!(page_ids, vec![ids[3], ids[4]]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn update_persists_reset_token() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_update");

    let mut stored = repo.create(user(&builder, 0, true)).await.unwrap();
    stored.password_reset_token = Some("reset-0".to_string());
    stored.password_reset_requested_at = Some(Utc::now());
    repo.update(stored.clone()).await.unwrap();

    let found = repo.find_by_reset_token("reset-0").await.unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert!(found.password_reset_requested_at.is_some());

    assert!(repo.delete(stored.id).await.unwrap());
    assert!(repo.find_by_id(stored.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn tokens_are_touched_and_swept() {
    let db = TestDatabase::new().await;
    let users = PgUserRepository::new(db.connection());
    let tokens = PgTokenRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_tokens");

    let owner = users.create(user(&builder, 0, true)).await.unwrap();
    tokens.create(AuthToken::new("fresh".into(), owner.id)).await.unwrap();
    tokens.create(AuthToken::new("stale".into(), owner.id)).await.unwrap();

    let now = Utc::now();
    tokens.touch("stale", now - Duration::days(8)).await.unwrap();

    let removed = tokens.delete_unused_since(now - Duration::days(7)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(tokens.find("stale").await.unwrap().is_none());
    assert_eq!(tokens.find("fresh").await.unwrap().unwrap().user_id, owner.id);

    assert_eq!(tokens.delete_for_user(owner.id).await.unwrap(), 1);
}
