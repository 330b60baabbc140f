//! ListAttendeesHandler - Query handler for attendee records.

use std::sync::Arc;

use super::load_session;
use crate::domain::foundation::{AuthenticatedUser, SessionId, UserId};
use crate::domain::session::{Page, PageMeta, PageRequest, SessionAttendee, SessionError};
use crate::ports::{AttendeeCount, AttendeeQuery, SessionRepository};

/// Whose records to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeScope {
    /// Everyone registered for a session. Proposer or elevated only.
    Session(SessionId),
    /// Everything a user registered for. That user or elevated only.
    User(UserId),
}

#[derive(Debug, Clone)]
pub struct ListAttendeesQuery {
    pub actor: AuthenticatedUser,
    pub scope: AttendeeScope,
    pub page: PageRequest,
}

/// Handler for attendee listings.
pub struct ListAttendeesHandler {
    repository: Arc<dyn SessionRepository>,
}

impl ListAttendeesHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListAttendeesQuery,
    ) -> Result<Page<SessionAttendee>, SessionError> {
        let (records, criteria) = match query.scope {
            AttendeeScope::Session(session_id) => {
                let session = load_session(self.repository.as_ref(), &session_id).await?;
                session.authorize(&query.actor)?;
                (
                    AttendeeQuery::for_session(session_id, query.page),
                    AttendeeCount {
                        session_id: Some(session_id),
                        ..AttendeeCount::default()
                    },
                )
            }
            AttendeeScope::User(user_id) => {
                if !query.actor.owns_or_moderates(&user_id) {
                    return Err(SessionError::Forbidden);
                }
                (
                    AttendeeQuery::for_user(user_id, query.page),
                    AttendeeCount {
                        user_id: Some(user_id),
                        ..AttendeeCount::default()
                    },
                )
            }
        };

        let items = self.repository.find_attendees(&records).await?;
        let total = self.repository.count_attendees(&criteria).await?;

        Ok(Page {
            items,
            meta: PageMeta::new(&query.page, total),
        })
    }
}
