//! UnregisterAttendeeHandler - Command handler for giving a seat back.

use std::sync::Arc;

use super::{load_attendee, load_session};
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_reason, SessionAttendee, SessionError};
use crate::ports::{Clock, SessionRepository};

/// Command to unregister the caller from a session.
#[derive(Debug, Clone)]
pub struct UnregisterAttendeeCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub reason: String,
}

/// Handler for unregistering. The record stays, marked with the reason.
pub struct UnregisterAttendeeHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl UnregisterAttendeeHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(
        &self,
        cmd: UnregisterAttendeeCommand,
    ) -> Result<SessionAttendee, SessionError> {
        validate_reason("reason", &cmd.reason)?;
        let now = self.clock.now();

        let session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.ensure_registration_open(&now)?;

        let mut attendee =
            load_attendee(self.repository.as_ref(), &cmd.session_id, &cmd.actor.id).await?;
        attendee.unregister(cmd.reason, now)?;
        self.repository.update_attendee(&attendee).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Attendee unregistered"
        );

        Ok(attendee)
    }
}
