//! Domain types, error taxonomy, and validation rules shared by the
//! Marknotes server crates.

pub mod accounts;
pub mod categories;
pub mod color;
pub mod error;
pub mod notes;
pub mod tags;
pub mod types;
