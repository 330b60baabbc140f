//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) live side by side,
//! one struct per operation.

pub mod handlers;

pub use handlers::session::{
    // Commands
    AcceptSessionCommand, AcceptSessionHandler, CancelSessionCommand, CancelSessionHandler,
    DeleteSessionCommand, DeleteSessionHandler, ProposeSessionCommand, ProposeSessionHandler,
    RegisterAttendeeCommand, RegisterAttendeeHandler, RejectSessionCommand, RejectSessionHandler,
    RemoveReviewCommand, RemoveReviewHandler, ReviewSessionCommand, ReviewSessionHandler,
    UnregisterAttendeeCommand, UnregisterAttendeeHandler, UpdateSessionCommand,
    UpdateSessionHandler,
    // Queries
    AttendeeScope, GetSessionHandler, GetSessionQuery, ListAttendeesHandler, ListAttendeesQuery,
    ListSessionsHandler, ListSessionsQuery, SessionView,
};
