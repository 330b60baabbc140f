//! UpdateSessionHandler - Command handler for editing a pending proposal.

use std::sync::Arc;

use super::load_session;
use crate::domain::foundation::{AuthenticatedUser, SessionId};
use crate::domain::session::{validate_patch, Session, SessionError, SessionPatch};
use crate::ports::{Clock, SessionRepository};

/// Command to update a session.
#[derive(Debug, Clone)]
pub struct UpdateSessionCommand {
    pub actor: AuthenticatedUser,
    pub session_id: SessionId,
    pub patch: SessionPatch,
}

/// Handler for updating sessions.
pub struct UpdateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl UpdateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn handle(&self, cmd: UpdateSessionCommand) -> Result<Session, SessionError> {
        // 1. Validate patch
        validate_patch(&cmd.patch)?;

        // 2. Load session
        let mut session = load_session(self.repository.as_ref(), &cmd.session_id).await?;

        // 3. Authorize - proposer or elevated
        session.authorize(&cmd.actor)?;

        // 4. Apply patch and persist
        session.update(cmd.patch, self.clock.now())?;
        self.repository.update(&session).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %cmd.actor.id,
            "Session updated"
        );

        Ok(session)
    }
}
