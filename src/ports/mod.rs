//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionRepository` - Sessions and attendee records
//! - `SessionValidator` - Bearer token validation
//! - `Clock` - Current time for lifecycle rules
//! - `IdGenerator` - New session identifiers

mod clock;
mod id_generator;
mod session_repository;
mod session_validator;

pub use clock::Clock;
pub use id_generator::IdGenerator;
pub use session_repository::{AttendeeCount, AttendeeQuery, RegistrationOutcome, SessionRepository};
pub use session_validator::SessionValidator;
