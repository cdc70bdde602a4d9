//! Integration tests for the session repository.

use chrono::{Duration, Utc};
use marknotes_db::models::session::CreateSession;
use marknotes_db::models::user::CreateUser;
use marknotes_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_user(pool: &PgPool, email: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        full_name: None,
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn open_session(pool: &PgPool, user_id: i64, ttl: Duration) -> Uuid {
    let input = CreateSession {
        user_id,
        token_id: Uuid::new_v4(),
        expires_at: Utc::now() + ttl,
        user_agent: None,
    };
    SessionRepo::create(pool, &input).await.unwrap().token_id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_affects_only_named_session(pool: PgPool) {
    let user = create_user(&pool, "sessions@test.com").await;
    let first = open_session(&pool, user, Duration::hours(1)).await;
    let second = open_session(&pool, user, Duration::hours(1)).await;

    assert!(SessionRepo::revoke(&pool, first, user).await.unwrap());
    assert!(!SessionRepo::revoke(&pool, first, user).await.unwrap());

    assert!(SessionRepo::find_active(&pool, first).await.unwrap().is_none());
    assert!(SessionRepo::find_active(&pool, second).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_requires_owner(pool: PgPool) {
    let alice = create_user(&pool, "alice@test.com").await;
    let bob = create_user(&pool, "bob@test.com").await;
    let token = open_session(&pool, alice, Duration::hours(1)).await;

    assert!(!SessionRepo::revoke(&pool, token, bob).await.unwrap());
    assert!(SessionRepo::find_active(&pool, token).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_session_is_inactive_and_cleaned_up(pool: PgPool) {
    let user = create_user(&pool, "cleanup@test.com").await;
    let expired = open_session(&pool, user, Duration::minutes(-5)).await;
    let revoked = open_session(&pool, user, Duration::hours(1)).await;
    let live = open_session(&pool, user, Duration::hours(1)).await;
    SessionRepo::revoke(&pool, revoked, user).await.unwrap();

    assert!(SessionRepo::find_active(&pool, expired).await.unwrap().is_none());

    let removed = SessionRepo::cleanup_for_user(&pool, user).await.unwrap();
    assert_eq!(removed, 2);
    assert!(SessionRepo::find_active(&pool, live).await.unwrap().is_some());
}
