//! GetSessionHandler - Query handler for a single session.

use std::sync::Arc;

use super::load_session;
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{Session, SessionError};
use crate::ports::{AttendeeCount, SessionRepository};

/// Query for one session.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
}

/// A session together with its occupied seats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub session: Session,
    pub attendee_count: u64,
}

/// Handler for fetching a session.
///
/// Sessions the caller may not see are reported as missing.
pub struct GetSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionView, SessionError> {
        let session = load_session(self.repository.as_ref(), &query.session_id).await?;
        if !session.is_visible_to(&query.actor) {
            return Err(SessionError::NotFound);
        }

        let attendee_count = self
            .repository
            .count_attendees(&AttendeeCount::seats_taken(query.session_id))
            .await?;

        Ok(SessionView {
            session,
            attendee_count,
        })
    }
}
