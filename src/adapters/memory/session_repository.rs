//! In-memory SessionRepository for tests and local runs.
//!
//! All state sits behind one `Mutex`, so `register_attendee` counts and
//! inserts under a single guard. No lock is held across an `.await`.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, UserId};
use crate::domain::session::{
    PageRequest, Session, SessionAttendee, SessionFilter, SessionSort, SortField, SortOrder,
};
use crate::ports::{AttendeeCount, AttendeeQuery, RegistrationOutcome, SessionRepository};

#[derive(Default)]
struct State {
    sessions: BTreeMap<SessionId, Session>,
    attendees: BTreeMap<(SessionId, UserId), SessionAttendee>,
}

impl State {
    fn live_session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id).filter(|s| s.deleted_at().is_none())
    }

    fn active_seats(&self, session_id: &SessionId) -> u64 {
        self.attendees
            .values()
            .filter(|a| &a.session_id == session_id && a.is_active())
            .count() as u64
    }
}

/// In-memory implementation of SessionRepository.
#[derive(Default)]
pub struct InMemorySessionRepository {
    state: Mutex<State>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, soft-deleted ones included.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Looks a session up regardless of soft-delete.
    pub fn find_including_deleted(&self, id: &SessionId) -> Option<Session> {
        self.lock().sessions.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn compare(a: &Session, b: &Session, sort: &SessionSort) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id().cmp(b.id()),
        SortField::Title => a.title().cmp(b.title()),
        SortField::StartAt => a.start_at().cmp(b.start_at()),
        SortField::EndAt => a.end_at().cmp(b.end_at()),
        SortField::Room => a.room().cmp(&b.room()),
        SortField::Capacity => a.capacity().cmp(&b.capacity()),
    };
    let ordering = match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    ordering.then_with(|| a.id().cmp(b.id()))
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.lock().live_session(id).cloned())
    }

    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        let mut state = self.lock();
        if state.sessions.contains_key(session.id()) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Session already exists: {}", session.id()),
            ));
        }
        state.sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut state = self.lock();
        match state.sessions.get_mut(session.id()) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )),
        }
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let mut state = self.lock();
        if state.sessions.remove(id).is_none() {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            ));
        }
        state.attendees.retain(|(session_id, _), _| session_id != id);
        Ok(())
    }

    async fn find_all(
        &self,
        filter: &SessionFilter,
        sort: &SessionSort,
        page: &PageRequest,
    ) -> Result<Vec<Session>, DomainError> {
        let state = self.lock();
        let mut matching: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, sort));
        Ok(page.slice(matching))
    }

    async fn count(&self, filter: &SessionFilter) -> Result<u64, DomainError> {
        let state = self.lock();
        Ok(state.sessions.values().filter(|s| filter.matches(s)).count() as u64)
    }

    async fn find_attendee(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<SessionAttendee>, DomainError> {
        Ok(self.lock().attendees.get(&(*session_id, *user_id)).cloned())
    }

    async fn find_attendees(&self, query: &AttendeeQuery) -> Result<Vec<SessionAttendee>, DomainError> {
        let state = self.lock();
        let mut matching: Vec<SessionAttendee> = state
            .attendees
            .values()
            .filter(|a| state.live_session(&a.session_id).is_some())
            .filter(|a| query.session_id.map_or(true, |id| a.session_id == id))
            .filter(|a| query.user_id.map_or(true, |id| a.user_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(query.page.slice(matching))
    }

    async fn create_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError> {
        let mut state = self.lock();
        let key = (attendee.session_id, attendee.user_id);
        if state.attendees.contains_key(&key) {
            return Err(DomainError::new(ErrorCode::Conflict, "Attendee already exists"));
        }
        state.attendees.insert(key, attendee.clone());
        Ok(())
    }

    async fn register_attendee(
        &self,
        attendee: &SessionAttendee,
        capacity: u32,
    ) -> Result<RegistrationOutcome, DomainError> {
        let mut state = self.lock();
        if state.live_session(&attendee.session_id).is_none() {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", attendee.session_id),
            ));
        }
        let key = (attendee.session_id, attendee.user_id);
        if state.attendees.contains_key(&key) {
            return Ok(RegistrationOutcome::AlreadyExists);
        }
        if state.active_seats(&attendee.session_id) >= capacity as u64 {
            return Ok(RegistrationOutcome::CapacityReached);
        }
        state.attendees.insert(key, attendee.clone());
        Ok(RegistrationOutcome::Registered)
    }

    async fn update_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError> {
        let mut state = self.lock();
        match state.attendees.get_mut(&(attendee.session_id, attendee.user_id)) {
            Some(stored) => {
                *stored = attendee.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::AttendeeNotFound,
                format!(
                    "Attendee not found: {} in {}",
                    attendee.user_id, attendee.session_id
                ),
            )),
        }
    }

    async fn count_attendees(&self, criteria: &AttendeeCount) -> Result<u64, DomainError> {
        let state = self.lock();
        let count = state
            .attendees
            .values()
            .filter(|a| criteria.session_id.map_or(true, |id| a.session_id == id))
            .filter(|a| criteria.user_id.map_or(true, |id| a.user_id == id))
            .filter(|a| !criteria.active_only || a.is_active())
            .filter(|a| match state.live_session(&a.session_id) {
                Some(session) => criteria
                    .overlapping
                    .as_ref()
                    .map_or(true, |(start, end)| session.overlaps(start, end)),
                None => false,
            })
            .count();
        Ok(count as u64)
    }
}
