//! ReviewSessionHandler - Command handler for an attendee's review.

use std::sync::Arc;

use super::{load_attendee, load_session};
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_reason, SessionAttendee, SessionError};
use crate::ports::{Clock, SessionRepository};

/// Command to review a session the caller attended.
#[derive(Debug, Clone)]
pub struct ReviewSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub review: String,
}

/// Handler for reviews. One review per attendee, after the session ends.
pub struct ReviewSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl ReviewSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: ReviewSessionCommand) -> Result<SessionAttendee, SessionError> {
        validate_reason("review", &cmd.review)?;
        let now = self.clock.now();

        let session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.ensure_concluded(&now)?;

        let mut attendee =
            load_attendee(self.repository.as_ref(), &cmd.session_id, &cmd.actor.id).await?;
        attendee.review(cmd.review, now)?;
        self.repository.update_attendee(&attendee).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session reviewed"
        );

        Ok(attendee)
    }
}
