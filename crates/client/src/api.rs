//! REST gateway for the Marknotes server.
//!
//! Every method is a single round trip: no retries, no caching, no
//! client-side timeout. The bearer token is read from the shared
//! [`Session`] at call time.

use std::sync::Arc;

use marknotes_core::types::DbId;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::{
    AuthResponse, Category, Credentials, DeleteCategoryResponse, HealthResponse, MeResponse,
    MessageResponse, NamedChanges, NamedInput, NewNote, Note, NoteChanges, NoteQuery,
    Registration, Tag, UserInfo,
};
use crate::session::Session;

/// HTTP client for one Marknotes server.
#[derive(Clone)]
pub struct NotesApi {
    client: reqwest::Client,
    /// Server origin, e.g. `http://localhost:5000`. Routes are under `/api`.
    base_url: String,
    session: Arc<Session>,
}

/// Shape of the server's error bodies. Only `error` is relied on.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl NotesApi {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ---- auth ----

    /// Register and store the returned token in the session.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserInfo, ClientError> {
        let body = Registration {
            email,
            password,
            full_name,
        };
        let auth: AuthResponse = self
            .send_json(self.request(Method::POST, "/auth/register").json(&body))
            .await?;
        self.session.set(auth.token).await?;
        Ok(auth.user)
    }

    /// Log in and store the returned token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let body = Credentials { email, password };
        let auth: AuthResponse = self
            .send_json(self.request(Method::POST, "/auth/login").json(&body))
            .await?;
        self.session.set(auth.token).await?;
        Ok(auth.user)
    }

    pub async fn me(&self) -> Result<UserInfo, ClientError> {
        let me: MeResponse = self.send_json(self.request(Method::GET, "/auth/me")).await?;
        Ok(me.user)
    }

    /// Revoke the server session. The local session is cleared whatever
    /// the server answers.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self
            .send_json::<MessageResponse>(self.request(Method::POST, "/auth/logout"))
            .await;
        self.session.clear().await?;
        result.map(|_| ())
    }

    // ---- notes ----

    pub async fn list_notes(&self, query: &NoteQuery) -> Result<Vec<Note>, ClientError> {
        self.send_json(self.request(Method::GET, "/notes").query(query))
            .await
    }

    pub async fn get_note(&self, id: DbId) -> Result<Note, ClientError> {
        self.send_json(self.request(Method::GET, &format!("/notes/{id}")))
            .await
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<Note, ClientError> {
        self.send_json(self.request(Method::POST, "/notes").json(note))
            .await
    }

    pub async fn update_note(&self, id: DbId, changes: &NoteChanges) -> Result<Note, ClientError> {
        self.send_json(self.request(Method::PUT, &format!("/notes/{id}")).json(changes))
            .await
    }

    pub async fn set_favorite(&self, id: DbId, is_favorite: bool) -> Result<Note, ClientError> {
        #[derive(Serialize)]
        struct Body {
            is_favorite: bool,
        }
        self.send_json(
            self.request(Method::PATCH, &format!("/notes/{id}/favorite"))
                .json(&Body { is_favorite }),
        )
        .await
    }

    pub async fn delete_note(&self, id: DbId) -> Result<(), ClientError> {
        self.send_unit(self.request(Method::DELETE, &format!("/notes/{id}")))
            .await
    }

    // ---- categories ----

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.send_json(self.request(Method::GET, "/categories"))
            .await
    }

    pub async fn create_category(&self, input: &NamedInput) -> Result<Category, ClientError> {
        self.send_json(self.request(Method::POST, "/categories").json(input))
            .await
    }

    pub async fn update_category(
        &self,
        id: DbId,
        changes: &NamedChanges,
    ) -> Result<Category, ClientError> {
        self.send_json(
            self.request(Method::PUT, &format!("/categories/{id}"))
                .json(changes),
        )
        .await
    }

    /// Delete a category. Returns how many notes were left uncategorized.
    pub async fn delete_category(&self, id: DbId) -> Result<u64, ClientError> {
        let response: DeleteCategoryResponse = self
            .send_json(self.request(Method::DELETE, &format!("/categories/{id}")))
            .await?;
        Ok(response.uncategorized_notes)
    }

    // ---- tags ----

    pub async fn list_tags(&self) -> Result<Vec<Tag>, ClientError> {
        self.send_json(self.request(Method::GET, "/tags")).await
    }

    /// Create a tag, or get the existing one with the same normalized name.
    pub async fn create_tag(&self, input: &NamedInput) -> Result<Tag, ClientError> {
        self.send_json(self.request(Method::POST, "/tags").json(input))
            .await
    }

    pub async fn update_tag(&self, id: DbId, changes: &NamedChanges) -> Result<Tag, ClientError> {
        self.send_json(self.request(Method::PUT, &format!("/tags/{id}")).json(changes))
            .await
    }

    pub async fn delete_tag(&self, id: DbId) -> Result<(), ClientError> {
        self.send_unit(self.request(Method::DELETE, &format!("/tags/{id}")))
            .await
    }

    pub async fn attach_tag(&self, tag_id: DbId, note_id: DbId) -> Result<(), ClientError> {
        self.send_unit(self.request(Method::POST, &format!("/tags/{tag_id}/notes/{note_id}")))
            .await
    }

    pub async fn detach_tag(&self, tag_id: DbId, note_id: DbId) -> Result<(), ClientError> {
        self.send_unit(self.request(Method::DELETE, &format!("/tags/{tag_id}/notes/{note_id}")))
            .await
    }

    // ---- misc ----

    /// `GET /health` (served at the root, not under `/api`).
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Start a request to `/api{path}` with the bearer token, if any.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await?;
        Self::parse_response(response).await
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        let response = builder.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Return the response unchanged on 2xx, otherwise a
    /// [`ClientError::Api`] carrying the server's `error` message.
    async fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
