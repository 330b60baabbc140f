//! RejectSessionHandler - Command handler for declining a proposal.

use std::sync::Arc;

use super::{load_session, require_elevated};
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_reason, Session, SessionError};
use crate::ports::{Clock, SessionRepository};

/// Command to reject a session with a reason.
#[derive(Debug, Clone)]
pub struct RejectSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub reason: String,
}

/// Handler for rejecting sessions. Coordinators only.
pub struct RejectSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl RejectSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: RejectSessionCommand) -> Result<Session, SessionError> {
        require_elevated(&cmd.actor)?;
        validate_reason("reason", &cmd.reason)?;

        let mut session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.reject(cmd.reason, self.clock.now())?;
        self.repository.update(&session).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session rejected"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{coordinator, user, Fixture};
    use super::*;
    use crate::domain::foundation::SessionStatus;

    fn handler(fx: &Fixture) -> RejectSessionHandler {
        RejectSessionHandler::new(fx.repo.clone(), fx.clock.clone())
    }

    fn command(actor: AuthenticatedUser, session: &Session, reason: &str) -> RejectSessionCommand {
        RejectSessionCommand {
            actor,
            session_id: *session.id(),
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn coordinator_rejects_with_reason() {
        let fx = Fixture::new();
        let session = fx.pending(user().id, fx.draft("Proposed talk", 30)).await;

        let rejected = handler(&fx)
            .handle(command(coordinator(), &session, "Off topic"))
            .await
            .unwrap();

        assert_eq!(rejected.status(), SessionStatus::Rejected);
        assert_eq!(rejected.status_reason(), Some("Off topic"));
    }

    #[tokio::test]
    async fn short_reason_is_a_validation_failure() {
        let fx = Fixture::new();
        let session = fx.pending(user().id, fx.draft("Proposed talk", 30)).await;

        let result = handler(&fx).handle(command(coordinator(), &session, "no")).await;

        assert!(matches!(result, Err(SessionError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn padded_reason_over_column_width_is_a_validation_failure() {
        let fx = Fixture::new();
        let session = fx.pending(user().id, fx.draft("Proposed talk", 30)).await;
        let padded = format!("abc{}", " ".repeat(300));

        let result = handler(&fx).handle(command(coordinator(), &session, &padded)).await;

        assert!(matches!(result, Err(SessionError::ValidationFailed(_))));
        let stored = fx.repo.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Pending);
    }

    #[tokio::test]
    async fn rejecting_an_accepted_session_is_refused() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Proposed talk", 30)).await;

        let result = handler(&fx)
            .handle(command(coordinator(), &session, "Changed our minds"))
            .await;

        assert!(matches!(result, Err(SessionError::CannotBeRejected)));
    }

    #[tokio::test]
    async fn regular_user_is_forbidden() {
        let fx = Fixture::new();
        let session = fx.pending(user().id, fx.draft("Proposed talk", 30)).await;

        let result = handler(&fx).handle(command(user(), &session, "Not good")).await;

        assert!(matches!(result, Err(SessionError::Forbidden)));
    }
}
