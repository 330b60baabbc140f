//! DeleteSessionHandler - Command handler for withdrawing a pending proposal.

use std::sync::Arc;

use super::load_session;
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::SessionError;
use crate::ports::SessionRepository;

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
}

/// Handler for deleting sessions. Only pending proposals are removed, and
/// the row is gone for good.
pub struct DeleteSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl DeleteSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: DeleteSessionCommand) -> Result<(), SessionError> {
        let session = load_session(self.repository.as_ref(), &cmd.session_id).await?;
        session.authorize(&cmd.actor)?;
        session.ensure_deletable()?;

        self.repository.delete(&cmd.session_id).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session deleted"
        );

        Ok(())
    }
}
