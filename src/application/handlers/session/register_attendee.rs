//! RegisterAttendeeHandler - Command handler for taking a seat in a session.

use std::sync::Arc;

use super::load_session;
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{SessionAttendee, SessionError};
use crate::ports::{AttendeeCount, Clock, RegistrationOutcome, SessionRepository};

/// Command to register the caller for a session.
#[derive(Debug, Clone)]
pub struct RegisterAttendeeCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
}

/// Handler for registrations.
///
/// The capacity and conflict counts give early, specific errors. The final
/// insert re-checks capacity atomically, so concurrent registrations never
/// overbook a session.
///
/// The schedule-conflict check is not part of that atomic insert. Two
/// concurrent requests from the same user for overlapping sessions lock
/// different session rows and can both succeed.
pub struct RegisterAttendeeHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl RegisterAttendeeHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(
        &self,
        cmd: RegisterAttendeeCommand,
    ) -> Result<SessionAttendee, SessionError> {
        let now = self.clock.now();

        // 1. Session must be accepted and not yet begun
        let session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.ensure_registration_open(&now)?;

        // 2. One record per user and session, ever
        if let Some(existing) = self
            .repository
            .find_attendee(&cmd.session_id, &cmd.actor.id)
            .await?
        {
            return Err(existing.reregistration_error());
        }

        // 3. Seats left
        let taken = self
            .repository
            .count_attendees(&AttendeeCount::seats_taken(cmd.session_id))
            .await?;
        if taken >= u64::from(session.capacity()) {
            return Err(SessionError::Full);
        }

        // 4. No overlapping registration
        let conflicts = self
            .repository
            .count_attendees(&AttendeeCount::schedule_conflicts(
                cmd.actor.id,
                *session.start_at(),
                *session.end_at(),
            ))
            .await?;
        if conflicts > 0 {
            return Err(SessionError::TimeConflict);
        }

        // 5. Conditional insert
        let attendee = SessionAttendee::register(cmd.session_id, cmd.actor.id, now);
        match self
            .repository
            .register_attendee(&attendee, session.capacity())
            .await?
        {
            RegistrationOutcome::Registered => {}
            RegistrationOutcome::CapacityReached => return Err(SessionError::Full),
            RegistrationOutcome::AlreadyExists => return Err(SessionError::AlreadyRegistered),
        }

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Attendee registered"
        );

        Ok(attendee)
    }
}
