//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::memory::InMemorySessionRepository;
use crate::adapters::system::{ManualClock, UuidV7Generator};
use crate::domain::foundation::{AuthenticatedUser, SessionId, Timestamp, UserId};
use crate::domain::session::{Session, SessionDraft, SessionPatch, TagSet};
use crate::ports::SessionRepository;

pub struct Fixture {
    pub repo: Arc<InMemorySessionRepository>,
    pub clock: Arc<ManualClock>,
    pub ids: Arc<UuidV7Generator>,
    pub start: Timestamp,
}

impl Fixture {
    /// Clock pinned two hours before `start`.
    pub fn new() -> Self {
        let start = Timestamp::now().plus_hours(2);
        Self {
            repo: Arc::new(InMemorySessionRepository::new()),
            clock: Arc::new(ManualClock::new(start.minus_hours(2))),
            ids: Arc::new(UuidV7Generator),
            start,
        }
    }

    pub fn draft(&self, title: &str, capacity: i32) -> SessionDraft {
        self.draft_at(title, self.start, capacity)
    }

    pub fn draft_at(&self, title: &str, start: Timestamp, capacity: i32) -> SessionDraft {
        SessionDraft {
            title: title.to_string(),
            description: None,
            session_type: 1,
            tags: TagSet::from_names(["BE"]),
            start_at: start,
            end_at: start.plus_hours(1),
            room: Some("Hall A".to_string()),
            meeting_url: None,
            capacity,
            image_uri: None,
        }
    }

    /// Stores a pending session for `proposer`, bypassing the handlers.
    pub async fn pending(&self, proposer: UserId, draft: SessionDraft) -> Session {
        let session = Session::propose(SessionId::new(), proposer, draft, self.clock_now()).unwrap();
        self.repo.create(&session).await.unwrap();
        session
    }

    /// Stores an accepted session, bypassing the handlers.
    pub async fn accepted(&self, draft: SessionDraft) -> Session {
        let mut session =
            Session::propose(SessionId::new(), UserId::random(), draft, self.clock_now()).unwrap();
        session.accept(SessionPatch::default(), self.clock_now()).unwrap();
        self.repo.create(&session).await.unwrap();
        session
    }

    pub fn clock_now(&self) -> Timestamp {
        use crate::ports::Clock;
        self.clock.now()
    }
}

pub fn user() -> AuthenticatedUser {
    AuthenticatedUser::user(UserId::random())
}

pub fn coordinator() -> AuthenticatedUser {
    AuthenticatedUser::coordinator(UserId::random())
}
