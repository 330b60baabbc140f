//! RemoveReviewHandler - Command handler for moderating a review.

use std::sync::Arc;

use super::{load_attendee, load_session, require_elevated};
use crate::domain::foundation::{AuthenticatedUser, SessionId, UserId};
use crate::domain::session::{validate_reason, SessionAttendee, SessionError};
use crate::ports::{Clock, SessionRepository};

/// Command to hide an attendee's review.
#[derive(Debug, Clone)]
pub struct RemoveReviewCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    /// Author of the review.
    pub user_id: UserId,
    pub reason: String,
}

/// Handler for review moderation. Coordinators only. The review text is
/// kept and the removal reason recorded next to it.
pub struct RemoveReviewHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl RemoveReviewHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: RemoveReviewCommand) -> Result<SessionAttendee, SessionError> {
        require_elevated(&cmd.actor)?;
        validate_reason("reason", &cmd.reason)?;

        let session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.ensure_accepted()?;

        let mut attendee =
            load_attendee(self.repository.as_ref(), &cmd.session_id, &cmd.user_id).await?;
        attendee.remove_review(cmd.reason, self.clock.now())?;
        self.repository.update_attendee(&attendee).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            reviewer_id = %cmd.user_id,
            "Review removed"
        );

        Ok(attendee)
    }
}
