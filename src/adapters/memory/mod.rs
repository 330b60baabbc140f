//! In-memory adapters for tests and local development.

mod session_repository;

pub use session_repository::InMemorySessionRepository;
