//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every method on an
//! owned resource takes the caller's `user_id` and filters by it, so a
//! row belonging to another user behaves exactly like a missing row.

pub mod category_repo;
pub mod note_repo;
pub mod session_repo;
pub mod tag_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use note_repo::NoteRepo;
pub use session_repo::SessionRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
