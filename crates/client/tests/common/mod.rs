//! In-process mock of the Marknotes REST API for client tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "mock-token";
pub const PASSWORD: &str = "password123";

#[derive(Default)]
pub struct Mock {
    next_id: i64,
    pub notes: Vec<Value>,
    pub categories: Vec<Value>,
    pub tags: Vec<Value>,
    /// GET hits per collection path.
    pub list_calls: HashMap<&'static str, usize>,
    /// Answer logout with a 500 and a non-JSON body.
    pub fail_logout: bool,
    pub logouts: usize,
}

impl Mock {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type MockState = Arc<Mutex<Mock>>;

/// Start the mock on an ephemeral port and return its origin.
pub async fn spawn_mock() -> (String, MockState) {
    let state: MockState = Arc::new(Mutex::new(Mock::default()));

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", get(get_note).delete(delete_note))
        .route("/api/notes/{id}/favorite", patch(set_favorite))
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/{id}", axum::routing::delete(delete_category))
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}/notes/{note_id}", post(attach_tag))
        .route("/api/teapot", get(teapot))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message, "code": "MOCK" }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

macro_rules! require_auth {
    ($headers:expr) => {
        if !authorized(&$headers) {
            return error(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        }
    };
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": "0.0.0", "db_healthy": true }))
}

async fn teapot() -> Response {
    (StatusCode::IM_A_TEAPOT, "short and stout").into_response()
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn auth_body(email: &str) -> Value {
    json!({ "message": "ok", "token": TOKEN, "user": { "id": 1, "email": email } })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    Json(auth_body(body["email"].as_str().unwrap_or_default())).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(auth_body(body["email"].as_str().unwrap_or_default())),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    require_auth!(headers);
    Json(json!({ "user": { "id": 1, "email": "mock@test.com", "fullName": "Mock" } }))
        .into_response()
}

async fn logout(State(state): State<MockState>) -> Response {
    let mut mock = state.lock().unwrap();
    mock.logouts += 1;
    if mock.fail_logout {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({ "message": "Logout successful" })).into_response()
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

async fn list_notes(State(state): State<MockState>, headers: HeaderMap) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    *mock.list_calls.entry("notes").or_default() += 1;
    Json(Value::Array(mock.notes.clone())).into_response()
}

async fn create_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    let id = mock.id();
    let category_id = body["category_id"].as_i64();
    let category = category_id
        .and_then(|cid| mock.categories.iter().find(|c| c["id"] == cid).cloned())
        .unwrap_or(Value::Null);
    let note = json!({
        "id": id,
        "title": body["title"].as_str().unwrap_or("Untitled Note"),
        "content": body["content"].as_str().unwrap_or(""),
        "category_id": category_id,
        "user_id": 1,
        "is_favorite": body["is_favorite"].as_bool().unwrap_or(false),
        "created_at": now(),
        "updated_at": now(),
        "category": category,
        "tags": [],
    });
    mock.notes.insert(0, note.clone());
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn get_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    require_auth!(headers);
    let mock = state.lock().unwrap();
    match mock.notes.iter().find(|n| n["id"] == id) {
        Some(note) => Json(note.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("Note with id {id} not found")),
    }
}

async fn set_favorite(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    match mock.notes.iter_mut().find(|n| n["id"] == id) {
        Some(note) => {
            note["is_favorite"] = body["is_favorite"].clone();
            note["updated_at"] = json!(now());
            Json(note.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, &format!("Note with id {id} not found")),
    }
}

async fn delete_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    let before = mock.notes.len();
    mock.notes.retain(|n| n["id"] != id);
    if mock.notes.len() == before {
        return error(StatusCode::NOT_FOUND, &format!("Note with id {id} not found"));
    }
    Json(json!({ "message": "Note deleted successfully" })).into_response()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

async fn list_categories(State(state): State<MockState>, headers: HeaderMap) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    *mock.list_calls.entry("categories").or_default() += 1;
    Json(Value::Array(mock.categories.clone())).into_response()
}

async fn create_category(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(headers);
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Category name is required");
    }
    let mut mock = state.lock().unwrap();
    let id = mock.id();
    let category = json!({
        "id": id,
        "name": name,
        "color": body["color"].as_str().unwrap_or("#3B82F6"),
        "user_id": 1,
        "created_at": now(),
    });
    mock.categories.push(category.clone());
    (StatusCode::CREATED, Json(category)).into_response()
}

async fn delete_category(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    mock.categories.retain(|c| c["id"] != id);
    let mut cleared = 0;
    for note in mock.notes.iter_mut().filter(|n| n["category_id"] == id) {
        note["category_id"] = Value::Null;
        note["category"] = Value::Null;
        cleared += 1;
    }
    Json(json!({ "message": "Category deleted successfully", "uncategorized_notes": cleared }))
        .into_response()
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn list_tags(State(state): State<MockState>, headers: HeaderMap) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    *mock.list_calls.entry("tags").or_default() += 1;
    Json(Value::Array(mock.tags.clone())).into_response()
}

async fn create_tag(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    require_auth!(headers);
    let name = body["name"].as_str().unwrap_or_default().trim().to_lowercase();
    let mut mock = state.lock().unwrap();
    if let Some(existing) = mock.tags.iter().find(|t| t["name"] == name.as_str()) {
        return (StatusCode::CREATED, Json(existing.clone())).into_response();
    }
    let id = mock.id();
    let tag = json!({
        "id": id,
        "name": name,
        "color": body["color"].as_str().unwrap_or("#10B981"),
        "user_id": 1,
        "created_at": now(),
    });
    mock.tags.push(tag.clone());
    (StatusCode::CREATED, Json(tag)).into_response()
}

async fn attach_tag(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((tag_id, note_id)): Path<(i64, i64)>,
) -> Response {
    require_auth!(headers);
    let mut mock = state.lock().unwrap();
    let Some(tag) = mock.tags.iter().find(|t| t["id"] == tag_id).cloned() else {
        return error(StatusCode::NOT_FOUND, &format!("Tag with id {tag_id} not found"));
    };
    let Some(note) = mock.notes.iter_mut().find(|n| n["id"] == note_id) else {
        return error(StatusCode::NOT_FOUND, &format!("Note with id {note_id} not found"));
    };
    let tags = note["tags"].as_array_mut().expect("tags array");
    if !tags.iter().any(|t| t["id"] == tag_id) {
        tags.push(tag);
    }
    Json(json!({ "message": "Tag added to note successfully" })).into_response()
}
