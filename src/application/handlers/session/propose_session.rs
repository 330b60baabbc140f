//! ProposeSessionHandler - Command handler for submitting a session proposal.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, SessionStatus};
use crate::domain::session::{validate_draft, Session, SessionDraft, SessionError, SessionFilter};
use crate::ports::{Clock, IdGenerator, SessionRepository};

/// Command to propose a new session.
#[derive(Debug, Clone)]
pub struct ProposeSessionCommand {
    pub actor: AuthenticatedUser,
    pub draft: SessionDraft,
}

/// Handler for proposing sessions.
///
/// A user may hold at most one pending proposal at a time.
pub struct ProposeSessionHandler {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl ProposeSessionHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            repository,
            clock,
            ids,
        }
    }

    pub async fn handle(&self, cmd: ProposeSessionCommand) -> Result<Session, SessionError> {
        // 1. Validate input
        validate_draft(&cmd.draft)?;

        // 2. One pending proposal per user
        let pending = SessionFilter {
            proposer_id: Some(cmd.actor.id),
            status: Some(SessionStatus::Pending),
            ..SessionFilter::default()
        };
        if self.repository.count(&pending).await? > 0 {
            return Err(SessionError::ProposalLimit);
        }

        // 3. Create and persist
        let session = Session::propose(
            self.ids.session_id(),
            cmd.actor.id,
            cmd.draft,
            self.clock.now(),
        )?;
        self.repository.create(&session).await?;

        tracing::info!(
            session_id = %session.id(),
            user_id = %cmd.actor.id,
            "Session proposed"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{user, Fixture};
    use super::*;

    fn handler(fx: &Fixture) -> ProposeSessionHandler {
        ProposeSessionHandler::new(fx.repo.clone(), fx.clock.clone(), fx.ids.clone())
    }

    #[tokio::test]
    async fn creates_pending_session_owned_by_caller() {
        let fx = Fixture::new();
        let actor = user();

        let session = handler(&fx)
            .handle(ProposeSessionCommand {
                actor,
                draft: fx.draft("Rust in production", 30),
            })
            .await
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Pending);
        assert!(session.is_proposed_by(&actor.id));
        assert_eq!(session.created_at(), &fx.clock_now());
        assert_eq!(fx.repo.find_by_id(session.id()).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn second_pending_proposal_hits_the_limit() {
        let fx = Fixture::new();
        let actor = user();
        let h = handler(&fx);
        h.handle(ProposeSessionCommand {
            actor,
            draft: fx.draft("First talk", 30),
        })
        .await
        .unwrap();

        let result = h
            .handle(ProposeSessionCommand {
                actor,
                draft: fx.draft("Second talk", 30),
            })
            .await;

        assert!(matches!(result, Err(SessionError::ProposalLimit)));
        assert_eq!(fx.repo.session_count(), 1);
    }

    #[tokio::test]
    async fn limit_is_per_proposer() {
        let fx = Fixture::new();
        let h = handler(&fx);
        for title in ["First talk", "Second talk"] {
            h.handle(ProposeSessionCommand {
                actor: user(),
                draft: fx.draft(title, 30),
            })
            .await
            .unwrap();
        }
        assert_eq!(fx.repo.session_count(), 2);
    }

    #[tokio::test]
    async fn accepted_proposal_frees_the_slot() {
        let fx = Fixture::new();
        let actor = user();
        let mut first = fx.pending(actor.id, fx.draft("First talk", 30)).await;
        first
            .accept(Default::default(), fx.clock_now())
            .unwrap();
        fx.repo.update(&first).await.unwrap();

        let result = handler(&fx)
            .handle(ProposeSessionCommand {
                actor,
                draft: fx.draft("Second talk", 30),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_anything_else() {
        let fx = Fixture::new();
        let actor = user();
        fx.pending(actor.id, fx.draft("Existing talk", 30)).await;

        let result = handler(&fx)
            .handle(ProposeSessionCommand {
                actor,
                draft: fx.draft("x", 0),
            })
            .await;

        match result {
            Err(SessionError::ValidationFailed(violations)) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
                assert!(fields.contains(&"title"));
                assert!(fields.contains(&"capacity"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
