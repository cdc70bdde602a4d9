//! Marknotes API server library.
//!
//! Exposes the building blocks (config, state, error handling, router)
//! so integration tests and the binary entrypoint share one code path.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
