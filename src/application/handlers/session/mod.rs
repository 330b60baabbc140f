//! Session command and query handlers.
//!
//! Each handler validates its input, checks the caller, loads what it
//! needs, applies one aggregate rule and writes the result back. Handlers
//! never log business errors; they return them.

mod accept_session;
mod cancel_session;
mod delete_session;
mod get_session;
mod list_attendees;
mod list_sessions;
mod propose_session;
mod register_attendee;
mod reject_session;
mod remove_review;
mod review_session;
mod unregister_attendee;
mod update_session;

#[cfg(test)]
mod test_support;

pub use accept_session::{AcceptSessionCommand, AcceptSessionHandler};
pub use cancel_session::{CancelSessionCommand, CancelSessionHandler};
pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use get_session::{GetSessionHandler, GetSessionQuery, SessionView};
pub use list_attendees::{AttendeeScope, ListAttendeesHandler, ListAttendeesQuery};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery};
pub use propose_session::{ProposeSessionCommand, ProposeSessionHandler};
pub use register_attendee::{RegisterAttendeeCommand, RegisterAttendeeHandler};
pub use reject_session::{RejectSessionCommand, RejectSessionHandler};
pub use remove_review::{RemoveReviewCommand, RemoveReviewHandler};
pub use review_session::{ReviewSessionCommand, ReviewSessionHandler};
pub use unregister_attendee::{UnregisterAttendeeCommand, UnregisterAttendeeHandler};
pub use update_session::{UpdateSessionCommand, UpdateSessionHandler};

use crate::domain::foundation::{AuthenticatedUser, SessionId, UserId};
use crate::domain::session::{Session, SessionAttendee, SessionError};
use crate::ports::SessionRepository;

async fn load_session(
    repository: &dyn SessionRepository,
    id: &SessionId,
) -> Result<Session, SessionError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or(SessionError::NotFound)
}

async fn load_attendee(
    repository: &dyn SessionRepository,
    session_id: &SessionId,
    user_id: &UserId,
) -> Result<SessionAttendee, SessionError> {
    repository
        .find_attendee(session_id, user_id)
        .await?
        .ok_or(SessionError::NotRegistered)
}

fn require_elevated(actor: &AuthenticatedUser) -> Result<(), SessionError> {
    if actor.is_elevated() {
        Ok(())
    } else {
        Err(SessionError::Forbidden)
    }
}
