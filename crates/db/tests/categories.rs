//! Integration tests for the category repository.

use assert_matches::assert_matches;
use marknotes_db::models::note::NewNote;
use marknotes_db::models::user::CreateUser;
use marknotes_db::repositories::{CategoryRepo, NoteRepo, UserRepo};
use sqlx::PgPool;

async fn create_user(pool: &PgPool, email: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        full_name: None,
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_sorted_by_name(pool: PgPool) {
    let user = create_user(&pool, "sort@test.com").await;
    for name in ["Work", "Personal", "Ideas"] {
        CategoryRepo::create(&pool, user, name, "#3B82F6").await.unwrap();
    }

    let names: Vec<_> = CategoryRepo::list(&pool, user)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Ideas", "Personal", "Work"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_scoped_to_owner(pool: PgPool) {
    let owner = create_user(&pool, "cat-owner@test.com").await;
    let other = create_user(&pool, "cat-other@test.com").await;
    let category = CategoryRepo::create(&pool, owner, "Work", "#3B82F6")
        .await
        .unwrap();

    let hijack = CategoryRepo::update(&pool, category.id, other, Some("Mine"), None)
        .await
        .unwrap();
    assert!(hijack.is_none());
    assert_matches!(CategoryRepo::delete(&pool, category.id, other).await, Ok(None));
    assert!(CategoryRepo::list(&pool, other).await.unwrap().is_empty());

    let renamed = CategoryRepo::update(&pool, category.id, owner, None, Some("#000000"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Work");
    assert_eq!(renamed.color, "#000000");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_uncategorizes_notes(pool: PgPool) {
    let user = create_user(&pool, "uncat@test.com").await;
    let category = CategoryRepo::create(&pool, user, "Trip", "#3B82F6")
        .await
        .unwrap();
    let note = NoteRepo::create(
        &pool,
        user,
        &NewNote {
            title: "Packing".to_string(),
            content: String::new(),
            category_id: Some(category.id),
            is_favorite: false,
        },
    )
    .await
    .unwrap();

    let cleared = CategoryRepo::delete(&pool, category.id, user).await.unwrap();
    assert_eq!(cleared, Some(1));

    let note = NoteRepo::find_row(&pool, note.id, user).await.unwrap().unwrap();
    assert_eq!(note.category_id, None);
    assert!(!CategoryRepo::exists(&pool, category.id, user).await.unwrap());
}
