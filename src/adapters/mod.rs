//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - JWT and mock `SessionValidator`s
//! - `http` - axum REST surface
//! - `memory` - In-memory `SessionRepository` for tests and local runs
//! - `postgres` - sqlx `SessionRepository` and migrations
//! - `system` - Clocks and id generators

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod system;
