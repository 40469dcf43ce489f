//! Credential store: user and application records plus the SQLite-backed
//! storage adapter the authentication service runs against.

pub mod models;
pub mod operations;

pub use models::{App, User};
pub use operations::SqlStorage;
