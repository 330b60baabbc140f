//! End-to-end lifecycle tests driving the application handlers against the
//! in-memory repository and a manual clock.

use std::sync::Arc;

use chrono::Duration;

use conference_sessions::adapters::memory::InMemorySessionRepository;
use conference_sessions::adapters::system::{ManualClock, UuidV7Generator};
use conference_sessions::application::{
    AcceptSessionCommand, AcceptSessionHandler, AttendeeScope, CancelSessionCommand,
    CancelSessionHandler, GetSessionHandler, GetSessionQuery, ListAttendeesHandler,
    ListAttendeesQuery, ListSessionsHandler, ListSessionsQuery, ProposeSessionCommand,
    ProposeSessionHandler, RegisterAttendeeCommand, RegisterAttendeeHandler, RemoveReviewCommand,
    RemoveReviewHandler, ReviewSessionCommand, ReviewSessionHandler, UnregisterAttendeeCommand,
    UnregisterAttendeeHandler,
};
use conference_sessions::domain::foundation::{
    AuthenticatedUser, SessionId, SessionStatus, Timestamp, UserId,
};
use conference_sessions::domain::session::{
    AttendeeState, PageRequest, SessionDraft, SessionError, SessionFilter, SessionPatch,
    SessionSort, TagSet,
};
use conference_sessions::ports::SessionRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct World {
    repo: Arc<InMemorySessionRepository>,
    clock: Arc<ManualClock>,
    start: Timestamp,
}

impl World {
    fn new() -> Self {
        let start = Timestamp::now().plus_hours(24);
        Self {
            repo: Arc::new(InMemorySessionRepository::new()),
            clock: Arc::new(ManualClock::new(start.minus_hours(24))),
            start,
        }
    }

    fn draft(&self, title: &str, start: Timestamp, capacity: i32) -> SessionDraft {
        SessionDraft {
            title: title.to_string(),
            description: Some("A session".to_string()),
            session_type: 1,
            tags: TagSet::from_names(["BE", "DS"]),
            start_at: start,
            end_at: start.plus_hours(1),
            room: Some("Room 1".to_string()),
            meeting_url: None,
            capacity,
            image_uri: None,
        }
    }

    async fn propose(&self, speaker: AuthenticatedUser, draft: SessionDraft) -> SessionId {
        let session = ProposeSessionHandler::new(
            self.repo.clone(),
            self.clock.clone(),
            Arc::new(UuidV7Generator),
        )
        .handle(ProposeSessionCommand {
            actor: speaker,
            draft,
        })
        .await
        .unwrap();
        *session.id()
    }

    async fn accept(&self, session_id: SessionId) {
        AcceptSessionHandler::new(self.repo.clone(), self.clock.clone())
            .handle(AcceptSessionCommand {
                actor: coordinator(),
                session_id,
                patch: SessionPatch::default(),
            })
            .await
            .unwrap();
    }

    fn register_handler(&self) -> RegisterAttendeeHandler {
        RegisterAttendeeHandler::new(self.repo.clone(), self.clock.clone())
    }

    async fn register(
        &self,
        actor: AuthenticatedUser,
        session_id: SessionId,
    ) -> Result<(), SessionError> {
        self.register_handler()
            .handle(RegisterAttendeeCommand { actor, session_id })
            .await
            .map(|_| ())
    }
}

fn user() -> AuthenticatedUser {
    AuthenticatedUser::user(UserId::random())
}

fn coordinator() -> AuthenticatedUser {
    AuthenticatedUser::coordinator(UserId::random())
}

// =============================================================================
// Full lifecycle
// =============================================================================

#[tokio::test]
async fn propose_accept_register_review_moderate() {
    let world = World::new();
    let speaker = user();
    let attendee = user();

    let session_id = world
        .propose(speaker, world.draft("Ownership in practice", world.start, 10))
        .await;
    world.accept(session_id).await;
    world.register(attendee, session_id).await.unwrap();

    let view = GetSessionHandler::new(world.repo.clone())
        .handle(GetSessionQuery {
            actor: user(),
            session_id,
        })
        .await
        .unwrap();
    assert_eq!(view.session.status(), SessionStatus::Accepted);
    assert_eq!(view.attendee_count, 1);

    // Reviews open once the session is over.
    let review = ReviewSessionHandler::new(world.repo.clone(), world.clock.clone());
    let early = review
        .handle(ReviewSessionCommand {
            actor: attendee,
            session_id,
            review: "Loved it".to_string(),
        })
        .await;
    assert!(matches!(early, Err(SessionError::NotStarted)));

    world.clock.set(world.start.plus_hours(2));
    let reviewed = review
        .handle(ReviewSessionCommand {
            actor: attendee,
            session_id,
            review: "Loved it".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(reviewed.state(), AttendeeState::Reviewed);

    let removed = RemoveReviewHandler::new(world.repo.clone(), world.clock.clone())
        .handle(RemoveReviewCommand {
            actor: coordinator(),
            session_id,
            user_id: attendee.id,
            reason: "Spam link".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(removed.state(), AttendeeState::ReviewRemoved);

    let again = review
        .handle(ReviewSessionCommand {
            actor: attendee,
            session_id,
            review: "Loved it again".to_string(),
        })
        .await;
    assert!(matches!(again, Err(SessionError::ReviewDeleted)));
}

#[tokio::test]
async fn unregister_frees_seat_but_blocks_reregistration() {
    let world = World::new();
    let session_id = world
        .propose(user(), world.draft("Single seat", world.start, 1))
        .await;
    world.accept(session_id).await;
    let first = user();
    world.register(first, session_id).await.unwrap();

    assert!(matches!(
        world.register(user(), session_id).await,
        Err(SessionError::Full)
    ));

    UnregisterAttendeeHandler::new(world.repo.clone(), world.clock.clone())
        .handle(UnregisterAttendeeCommand {
            actor: first,
            session_id,
            reason: "Conflict at work".to_string(),
        })
        .await
        .unwrap();

    assert!(world.register(user(), session_id).await.is_ok());
    assert!(matches!(
        world.register(first, session_id).await,
        Err(SessionError::Cancelled)
    ));
}

#[tokio::test]
async fn overlapping_registration_is_refused_and_cancelled_sessions_disappear() {
    let world = World::new();
    let attendee = user();
    let morning = world
        .propose(user(), world.draft("Morning", world.start, 10))
        .await;
    let overlapping = world
        .propose(
            user(),
            world.draft("Overlap", world.start.plus_minutes(30), 10),
        )
        .await;
    let afternoon = world
        .propose(user(), world.draft("Afternoon", world.start.plus_hours(1), 10))
        .await;
    world.accept(morning).await;
    world.accept(overlapping).await;
    world.accept(afternoon).await;
    world.register(attendee, morning).await.unwrap();

    assert!(matches!(
        world.register(attendee, overlapping).await,
        Err(SessionError::TimeConflict)
    ));
    // Back-to-back is fine.
    world.register(attendee, afternoon).await.unwrap();

    CancelSessionHandler::new(world.repo.clone(), world.clock.clone())
        .handle(CancelSessionCommand {
            actor: coordinator(),
            session_id: overlapping,
            reason: Some("Speaker unavailable".to_string()),
        })
        .await
        .unwrap();

    // Cancelled sessions are soft-deleted.
    assert!(matches!(
        world.register(user(), overlapping).await,
        Err(SessionError::NotFound)
    ));

    let listing = ListSessionsHandler::new(world.repo.clone())
        .handle(ListSessionsQuery {
            actor: attendee,
            filter: SessionFilter {
                status: Some(SessionStatus::Accepted),
                ..SessionFilter::default()
            },
            sort: SessionSort::default(),
            page: PageRequest::default(),
        })
        .await
        .unwrap();
    assert_eq!(listing.meta.total_data, 2);
    assert!(listing.items.iter().all(|s| s.id() != &overlapping));

    let registrations = ListAttendeesHandler::new(world.repo.clone())
        .handle(ListAttendeesQuery {
            actor: attendee,
            scope: AttendeeScope::User(attendee.id),
            page: PageRequest::default(),
        })
        .await
        .unwrap();
    assert_eq!(registrations.meta.total_data, 2);
    assert!(registrations
        .items
        .iter()
        .all(|a| a.state() == AttendeeState::Registered));
}

#[tokio::test]
async fn registration_closes_at_start() {
    let world = World::new();
    let session_id = world
        .propose(user(), world.draft("Punctual", world.start, 10))
        .await;
    world.accept(session_id).await;

    world.clock.set(world.start);
    assert!(matches!(
        world.register(user(), session_id).await,
        Err(SessionError::AlreadyStarted)
    ));

    world.clock.advance(Duration::hours(1));
    assert!(matches!(
        world.register(user(), session_id).await,
        Err(SessionError::AlreadyEnded)
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_never_overbook() {
    const CAPACITY: usize = 5;
    const RACERS: usize = 20;

    let world = World::new();
    let session_id = world
        .propose(user(), world.draft("Popular talk", world.start, CAPACITY as i32))
        .await;
    world.accept(session_id).await;
    let handler = Arc::new(world.register_handler());

    let tasks: Vec<_> = (0..RACERS)
        .map(|_| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(RegisterAttendeeCommand {
                        actor: user(),
                        session_id,
                    })
                    .await
            })
        })
        .collect();

    let mut registered = 0;
    let mut full = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => registered += 1,
            Err(SessionError::Full) => full += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(registered, CAPACITY);
    assert_eq!(full, RACERS - CAPACITY);
    let view = GetSessionHandler::new(world.repo.clone())
        .handle(GetSessionQuery {
            actor: coordinator(),
            session_id,
        })
        .await
        .unwrap();
    assert_eq!(view.attendee_count, CAPACITY as u64);
    assert!(world.repo.find_by_id(&session_id).await.unwrap().is_some());
}
