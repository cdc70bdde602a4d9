//! Request extractors that gate access to protected routes.
//!
//! - [`auth::BearerClaims`] -- a correctly signed, unexpired Bearer token.
//! - [`auth::AuthUser`] -- the above, plus a live session row.

pub mod auth;
