//! Wire types exchanged with the server.

use marknotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCategoryResponse {
    pub message: String,
    #[serde(default)]
    pub uncategorized_notes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_healthy: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// A note as the server returns it: category nested, tags flattened.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Note {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub category_id: Option<DbId>,
    pub user_id: DbId,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'a str>,
}

/// Body of `POST /notes`. Omitted fields take server defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Body of `PUT /notes/{id}`.
///
/// `category_id: Some(None)` is sent as `null` and clears the category;
/// `None` omits the key and keeps it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<DbId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Body of `POST /categories` and `POST /tags`.
#[derive(Debug, Clone, Serialize)]
pub struct NamedInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body of `PUT /categories/{id}` and `PUT /tags/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamedChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Server-side filters for `GET /notes`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_changes_distinguishes_clear_from_keep() {
        let keep = NoteChanges {
            title: Some("t".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&keep).unwrap(), serde_json::json!({ "title": "t" }));

        let clear = NoteChanges {
            category_id: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            serde_json::json!({ "category_id": null })
        );
    }

    #[test]
    fn user_info_without_full_name() {
        let user: UserInfo =
            serde_json::from_str(r#"{"id":1,"email":"a@b.c"}"#).unwrap();
        assert_eq!(user.full_name, None);
    }
}
