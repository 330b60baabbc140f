//! CancelSessionHandler - Command handler for calling off an accepted session.

use std::sync::Arc;

use super::{load_session, require_elevated};
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_reason, Session, SessionError};
use crate::ports::{Clock, SessionRepository};

/// Command to cancel a session.
#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub reason: Option<String>,
}

/// Handler for cancelling sessions.
///
/// Cancelling soft-deletes the session, so it drops out of every listing
/// and its attendees stop counting toward schedule conflicts.
pub struct CancelSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl CancelSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: CancelSessionCommand) -> Result<Session, SessionError> {
        require_elevated(&cmd.actor)?;
        if let Some(reason) = &cmd.reason {
            validate_reason("reason", reason)?;
        }

        let mut session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.cancel(cmd.reason, self.clock.now())?;
        self.repository.update(&session).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session cancelled"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{coordinator, user, Fixture};
    use super::*;
    use crate::domain::foundation::SessionStatus;

    fn handler(fx: &Fixture) -> CancelSessionHandler {
        CancelSessionHandler::new(fx.repo.clone(), fx.clock.clone())
    }

    fn command(session: &Session) -> CancelSessionCommand {
        CancelSessionCommand {
            actor: coordinator(),
            session_id: *session.id(),
            reason: Some("Speaker is ill".to_string()),
        }
    }

    #[tokio::test]
    async fn cancel_soft_deletes_the_session() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Scheduled talk", 30)).await;

        let cancelled = handler(&fx).handle(command(&session)).await.unwrap();

        assert_eq!(cancelled.status(), SessionStatus::Cancelled);
        assert_eq!(cancelled.deleted_at(), Some(&fx.clock_now()));
        assert_eq!(cancelled.status_reason(), Some("Speaker is ill"));
        assert!(fx.repo.find_by_id(session.id()).await.unwrap().is_none());
        assert!(fx.repo.find_including_deleted(session.id()).is_some());
    }

    #[tokio::test]
    async fn pending_session_is_not_accepted() {
        let fx = Fixture::new();
        let session = fx.pending(user().id, fx.draft("Proposed talk", 30)).await;

        let result = handler(&fx).handle(command(&session)).await;

        assert!(matches!(result, Err(SessionError::NotAccepted)));
    }

    #[tokio::test]
    async fn started_session_cannot_be_cancelled() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Scheduled talk", 30)).await;
        fx.clock.set(fx.start);

        let result = handler(&fx).handle(command(&session)).await;

        assert!(matches!(result, Err(SessionError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn ended_session_reports_ended() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Scheduled talk", 30)).await;
        fx.clock.set(fx.start.plus_hours(3));

        let result = handler(&fx).handle(command(&session)).await;

        assert!(matches!(result, Err(SessionError::AlreadyEnded)));
    }

    #[tokio::test]
    async fn reason_is_optional() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Scheduled talk", 30)).await;

        let cancelled = handler(&fx)
            .handle(CancelSessionCommand {
                reason: None,
                ..command(&session)
            })
            .await
            .unwrap();

        assert_eq!(cancelled.status_reason(), None);
    }

    #[tokio::test]
    async fn regular_user_is_forbidden() {
        let fx = Fixture::new();
        let session = fx.accepted(fx.draft("Scheduled talk", 30)).await;

        let result = handler(&fx)
            .handle(CancelSessionCommand {
                actor: user(),
                ..command(&session)
            })
            .await;

        assert!(matches!(result, Err(SessionError::Forbidden)));
    }
}
