//! Typed client for the Marknotes REST API.
//!
//! - [`api::NotesApi`] -- one method per endpoint, bearer token attached,
//!   failures normalized into [`error::ClientError`].
//! - [`session::Session`] -- the bearer token, optionally persisted to a file.
//! - [`store::NotebookStore`] -- in-memory notes, categories and tags that
//!   are re-fetched after every mutation.

pub mod api;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use api::NotesApi;
pub use error::ClientError;
pub use session::Session;
pub use store::{LoadState, NotebookStore, NoteFilter};
