//! AcceptSessionHandler - Command handler for approving a proposal.

use std::sync::Arc;

use super::{load_session, require_elevated};
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_patch, Session, SessionError, SessionPatch};
use crate::ports::{Clock, SessionRepository};

/// Command to accept a session, optionally with final edits.
#[derive(Debug, Clone)]
pub struct AcceptSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub patch: SessionPatch,
}

/// Handler for accepting sessions. Coordinators only.
pub struct AcceptSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl AcceptSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: AcceptSessionCommand) -> Result<Session, SessionError> {
        require_elevated(&cmd.actor)?;
        validate_patch(&cmd.patch)?;

        let mut session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.accept(cmd.patch, self.clock.now())?;
        self.repository.update(&session).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session accepted"
        );

        Ok(session)
    }
}
