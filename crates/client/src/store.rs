//! In-memory notebook state kept in sync with the server.
//!
//! Each collection is re-fetched after any mutation that can change it.
//! Refreshes of one collection run one at a time; a refresh that finds the
//! collection already fetched after its own invalidation returns without a
//! second round trip.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use marknotes_core::types::DbId;

use crate::api::NotesApi;
use crate::error::ClientError;
use crate::models::{
    Category, NamedChanges, NamedInput, NewNote, Note, NoteChanges, NoteQuery, Tag, UserInfo,
};

/// Load progress of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Never fetched (or cleared by sign-out).
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Loaded,
}

/// Sidebar filters applied locally by [`NotebookStore::filtered_notes`].
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    /// Case-insensitive substring matched against title and content.
    pub search: String,
    pub category_id: Option<DbId>,
    pub favorites_only: bool,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if self.favorites_only && !note.is_favorite {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if note.category_id != Some(category_id) {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || note.title.to_lowercase().contains(&needle)
            || note.content.to_lowercase().contains(&needle)
    }
}

trait Keyed {
    fn key(&self) -> DbId;
}

impl Keyed for Note {
    fn key(&self) -> DbId {
        self.id
    }
}

impl Keyed for Category {
    fn key(&self) -> DbId {
        self.id
    }
}

impl Keyed for Tag {
    fn key(&self) -> DbId {
        self.id
    }
}

struct Snapshot<T> {
    items: Vec<T>,
    index: HashMap<DbId, usize>,
    load: LoadState,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            load: LoadState::Idle,
        }
    }
}

/// One server-backed list, in server order, indexed by id.
struct Collection<T> {
    snapshot: RwLock<Snapshot<T>>,
    refresh_lock: tokio::sync::Mutex<()>,
    /// Bumped on every invalidation.
    requested: AtomicU64,
    /// Highest invalidation covered by a completed fetch.
    fetched: AtomicU64,
}

impl<T: Keyed + Clone> Collection<T> {
    fn new() -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::default()),
            refresh_lock: tokio::sync::Mutex::new(()),
            requested: AtomicU64::new(0),
            fetched: AtomicU64::new(0),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot<T>> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot<T>> {
        self.snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn items(&self) -> Vec<T> {
        self.read().items.clone()
    }

    fn get(&self, id: DbId) -> Option<T> {
        let snapshot = self.read();
        snapshot.index.get(&id).map(|&i| snapshot.items[i].clone())
    }

    fn load_state(&self) -> LoadState {
        self.read().load
    }

    /// Invalidate and re-fetch, coalescing with concurrent refreshes.
    async fn refresh<F, Fut>(&self, fetch: F) -> Result<(), ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ClientError>>,
    {
        let wanted = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.refresh_lock.lock().await;

        if self.fetched.load(Ordering::SeqCst) >= wanted {
            return Ok(());
        }
        // Everything requested so far is covered by the fetch below.
        let covers = self.requested.load(Ordering::SeqCst);

        let previous = {
            let mut snapshot = self.write();
            let previous = snapshot.load;
            snapshot.load = LoadState::Loading;
            previous
        };

        match fetch().await {
            Ok(items) => {
                let index = items.iter().enumerate().map(|(i, t)| (t.key(), i)).collect();
                *self.write() = Snapshot {
                    items,
                    index,
                    load: LoadState::Loaded,
                };
                self.fetched.fetch_max(covers, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                self.write().load = previous;
                Err(e)
            }
        }
    }

    fn clear(&self) {
        *self.write() = Snapshot::default();
    }
}

/// Client-side notebook: the signed-in user plus notes, categories and tags.
///
/// Methods take `&self`; share the store behind an `Arc` between tasks.
pub struct NotebookStore {
    api: NotesApi,
    user: RwLock<Option<UserInfo>>,
    notes: Collection<Note>,
    categories: Collection<Category>,
    tags: Collection<Tag>,
    last_error: Mutex<Option<String>>,
}

impl NotebookStore {
    pub fn new(api: NotesApi) -> Self {
        Self {
            api,
            user: RwLock::new(None),
            notes: Collection::new(),
            categories: Collection::new(),
            tags: Collection::new(),
            last_error: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &NotesApi {
        &self.api
    }

    // ---- reads ----

    pub fn user(&self) -> Option<UserInfo> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.items()
    }

    pub fn note(&self, id: DbId) -> Option<Note> {
        self.notes.get(id)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.items()
    }

    pub fn category(&self, id: DbId) -> Option<Category> {
        self.categories.get(id)
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.items()
    }

    pub fn tag(&self, id: DbId) -> Option<Tag> {
        self.tags.get(id)
    }

    pub fn notes_state(&self) -> LoadState {
        self.notes.load_state()
    }

    pub fn categories_state(&self) -> LoadState {
        self.categories.load_state()
    }

    pub fn tags_state(&self) -> LoadState {
        self.tags.load_state()
    }

    /// Notes matching `filter`, in server order.
    pub fn filtered_notes(&self, filter: &NoteFilter) -> Vec<Note> {
        self.notes
            .read()
            .items
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect()
    }

    /// Message of the most recent failed operation, for display.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn dismiss_error(&self) {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }

    // ---- session ----

    /// Resume a persisted session. Returns `false` when there is no token
    /// or the server no longer accepts it (the token is then discarded).
    pub async fn restore(&self) -> Result<bool, ClientError> {
        if !self.api.session().is_set() {
            return Ok(false);
        }
        match self.api.me().await {
            Ok(user) => {
                self.set_user(Some(user));
                self.track(self.load_all()).await?;
                Ok(true)
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Stored session rejected; signing out");
                self.api.session().clear().await?;
                Ok(false)
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let user = self.track(self.api.login(email, password)).await?;
        self.set_user(Some(user.clone()));
        self.track(self.load_all()).await?;
        Ok(user)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserInfo, ClientError> {
        let user = self
            .track(self.api.register(email, password, full_name))
            .await?;
        self.set_user(Some(user.clone()));
        self.track(self.load_all()).await?;
        Ok(user)
    }

    /// Sign out. Local state and the session are cleared even when the
    /// server call fails.
    pub async fn sign_out(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed; clearing local state anyway");
            if let Err(e) = self.api.session().clear().await {
                tracing::warn!(error = %e, "Failed to clear stored session");
            }
        }
        self.set_user(None);
        self.notes.clear();
        self.categories.clear();
        self.tags.clear();
        self.dismiss_error();
    }

    /// Fetch notes, categories and tags concurrently.
    pub async fn load_all(&self) -> Result<(), ClientError> {
        tokio::try_join!(
            self.refresh_notes(),
            self.refresh_categories(),
            self.refresh_tags()
        )?;
        Ok(())
    }

    pub async fn refresh_notes(&self) -> Result<(), ClientError> {
        let query = NoteQuery::default();
        self.notes
            .refresh(|| self.api.list_notes(&query))
            .await
    }

    pub async fn refresh_categories(&self) -> Result<(), ClientError> {
        self.categories
            .refresh(|| self.api.list_categories())
            .await
    }

    pub async fn refresh_tags(&self) -> Result<(), ClientError> {
        self.tags.refresh(|| self.api.list_tags()).await
    }

    // ---- notes ----

    pub async fn create_note(&self, note: NewNote) -> Result<Note, ClientError> {
        let created = self.track(self.api.create_note(&note)).await?;
        self.track(self.refresh_notes()).await?;
        Ok(created)
    }

    pub async fn update_note(&self, id: DbId, changes: NoteChanges) -> Result<Note, ClientError> {
        let updated = self.track(self.api.update_note(id, &changes)).await?;
        self.track(self.refresh_notes()).await?;
        Ok(updated)
    }

    /// Flip a note's favorite flag based on the locally known value.
    pub async fn toggle_favorite(&self, id: DbId) -> Result<Note, ClientError> {
        let current = match self.notes.get(id) {
            Some(note) => note.is_favorite,
            None => self.track(self.api.get_note(id)).await?.is_favorite,
        };
        self.set_favorite(id, !current).await
    }

    pub async fn set_favorite(&self, id: DbId, is_favorite: bool) -> Result<Note, ClientError> {
        let updated = self.track(self.api.set_favorite(id, is_favorite)).await?;
        self.track(self.refresh_notes()).await?;
        Ok(updated)
    }

    pub async fn delete_note(&self, id: DbId) -> Result<(), ClientError> {
        self.track(self.api.delete_note(id)).await?;
        self.track(self.refresh_notes()).await
    }

    // ---- categories ----

    pub async fn create_category(
        &self,
        name: &str,
        color: Option<&str>,
    ) -> Result<Category, ClientError> {
        let input = NamedInput {
            name: name.to_string(),
            color: color.map(str::to_string),
        };
        let created = self.track(self.api.create_category(&input)).await?;
        self.track(self.refresh_categories()).await?;
        Ok(created)
    }

    /// Update a category; notes are refreshed too since they embed it.
    pub async fn update_category(
        &self,
        id: DbId,
        changes: NamedChanges,
    ) -> Result<Category, ClientError> {
        let updated = self.track(self.api.update_category(id, &changes)).await?;
        self.track(self.refresh_with_notes(self.refresh_categories()))
            .await?;
        Ok(updated)
    }

    pub async fn delete_category(&self, id: DbId) -> Result<u64, ClientError> {
        let uncategorized = self.track(self.api.delete_category(id)).await?;
        self.track(self.refresh_with_notes(self.refresh_categories()))
            .await?;
        Ok(uncategorized)
    }

    // ---- tags ----

    pub async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag, ClientError> {
        let input = NamedInput {
            name: name.to_string(),
            color: color.map(str::to_string),
        };
        let tag = self.track(self.api.create_tag(&input)).await?;
        self.track(self.refresh_tags()).await?;
        Ok(tag)
    }

    pub async fn update_tag(&self, id: DbId, changes: NamedChanges) -> Result<Tag, ClientError> {
        let tag = self.track(self.api.update_tag(id, &changes)).await?;
        self.track(self.refresh_with_notes(self.refresh_tags()))
            .await?;
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: DbId) -> Result<(), ClientError> {
        self.track(self.api.delete_tag(id)).await?;
        self.track(self.refresh_with_notes(self.refresh_tags()))
            .await
    }

    pub async fn attach_tag(&self, tag_id: DbId, note_id: DbId) -> Result<(), ClientError> {
        self.track(self.api.attach_tag(tag_id, note_id)).await?;
        self.track(self.refresh_notes()).await
    }

    pub async fn detach_tag(&self, tag_id: DbId, note_id: DbId) -> Result<(), ClientError> {
        self.track(self.api.detach_tag(tag_id, note_id)).await?;
        self.track(self.refresh_notes()).await
    }

    // ---- private helpers ----

    /// Refresh notes alongside another collection whose entities notes embed.
    async fn refresh_with_notes(
        &self,
        other: impl Future<Output = Result<(), ClientError>>,
    ) -> Result<(), ClientError> {
        tokio::try_join!(other, self.refresh_notes())?;
        Ok(())
    }

    fn set_user(&self, user: Option<UserInfo>) {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user;
    }

    /// Record `err` as the user-visible error and hand it back.
    fn record(&self, err: ClientError) -> ClientError {
        tracing::warn!(error = %err, "Notebook operation failed");
        *self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(err.to_string());
        err
    }

    async fn track<T>(
        &self,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        fut.await.map_err(|e| self.record(e))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn note(id: DbId, title: &str, content: &str, category_id: Option<DbId>, fav: bool) -> Note {
        Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            category_id,
            user_id: 1,
            is_favorite: fav,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = NoteFilter::default();
        assert!(filter.matches(&note(1, "a", "b", None, false)));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let filter = NoteFilter {
            search: "  MiLk ".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&note(1, "Groceries", "buy milk", None, false)));
        assert!(filter.matches(&note(2, "Milkshake recipe", "", None, false)));
        assert!(!filter.matches(&note(3, "Work", "slides", None, false)));
    }

    #[test]
    fn category_and_favorite_filters_combine() {
        let filter = NoteFilter {
            category_id: Some(7),
            favorites_only: true,
            ..Default::default()
        };
        assert!(filter.matches(&note(1, "a", "", Some(7), true)));
        assert!(!filter.matches(&note(2, "a", "", Some(7), false)));
        assert!(!filter.matches(&note(3, "a", "", Some(8), true)));
        assert!(!filter.matches(&note(4, "a", "", None, true)));
    }

    #[tokio::test]
    async fn refresh_indexes_items_by_id() {
        let collection: Collection<Note> = Collection::new();
        collection
            .refresh(|| async {
                Ok(vec![
                    note(5, "five", "", None, false),
                    note(2, "two", "", None, false),
                ])
            })
            .await
            .unwrap();

        assert_eq!(collection.load_state(), LoadState::Loaded);
        assert_eq!(collection.get(2).unwrap().title, "two");
        let order: Vec<_> = collection.items().iter().map(|n| n.id).collect();
        assert_eq!(order, vec![5, 2]);
    }

    #[tokio::test]
    async fn failed_refresh_restores_previous_state() {
        let collection: Collection<Note> = Collection::new();
        let result = collection
            .refresh(|| async {
                Err(ClientError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(collection.load_state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn queued_refresh_is_skipped_when_already_covered() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::Arc;

        let collection: Arc<Collection<Note>> = Arc::new(Collection::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        // First refresh holds the lock until released.
        let first = {
            let collection = Arc::clone(&collection);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                collection
                    .refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = release_rx.await;
                        Ok(vec![])
                    })
                    .await
            })
        };
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        // Two more invalidations queue up behind it.
        let queued: Vec<_> = (0..2)
            .map(|_| {
                let collection = Arc::clone(&collection);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    collection
                        .refresh(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(vec![])
                        })
                        .await
                })
            })
            .collect();
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        let _ = release_tx.send(());
        first.await.unwrap().unwrap();
        for handle in queued {
            handle.await.unwrap().unwrap();
        }

        // The first fetch plus one fetch covering both queued invalidations.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
