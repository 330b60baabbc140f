//! PostgreSQL implementation of SessionRepository.
//!
//! Sessions and attendee records live in `sessions` and `session_attendees`
//! (see `migrations/`). Listing filters are assembled with `QueryBuilder`;
//! every value is bound and sort columns only come from `SortField`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionStatus, Timestamp, UserId,
};
use crate::domain::session::{
    PageRequest, Session, SessionAttendee, SessionFilter, SessionRecord, SessionSort, SessionType,
    TagSet,
};
use crate::ports::{AttendeeCount, AttendeeQuery, RegistrationOutcome, SessionRepository};

const SESSION_COLUMNS: &str = "id, proposer_id, title, description, session_type, tags, \
     start_at, end_at, room, meeting_url, capacity, image_uri, status, status_reason, \
     created_at, updated_at, deleted_at";

const ATTENDEE_COLUMNS: &str =
    "session_id, user_id, reason, review, deleted_reason, created_at, updated_at";

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sessions WHERE id = $1 AND deleted_at IS NULL",
            SESSION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch session", e))?;

        row.map(Session::try_from).transpose()
    }

    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, proposer_id, title, description, session_type, tags,
                start_at, end_at, room, meeting_url, capacity, image_uri,
                status, status_reason, created_at, updated_at, deleted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.proposer_id().as_uuid())
        .bind(session.title())
        .bind(session.description())
        .bind(session.session_type().code())
        .bind(session.tags().to_mask())
        .bind(session.start_at().as_datetime())
        .bind(session.end_at().as_datetime())
        .bind(session.room())
        .bind(session.meeting_url())
        .bind(session.capacity() as i32)
        .bind(session.image_uri())
        .bind(session.status().code())
        .bind(session.status_reason())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .bind(session.deleted_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                title = $2,
                description = $3,
                session_type = $4,
                tags = $5,
                start_at = $6,
                end_at = $7,
                room = $8,
                meeting_url = $9,
                capacity = $10,
                image_uri = $11,
                status = $12,
                status_reason = $13,
                updated_at = $14,
                deleted_at = $15
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.title())
        .bind(session.description())
        .bind(session.session_type().code())
        .bind(session.tags().to_mask())
        .bind(session.start_at().as_datetime())
        .bind(session.end_at().as_datetime())
        .bind(session.room())
        .bind(session.meeting_url())
        .bind(session.capacity() as i32)
        .bind(session.image_uri())
        .bind(session.status().code())
        .bind(session.status_reason())
        .bind(session.updated_at().as_datetime())
        .bind(session.deleted_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn find_all(
        &self,
        filter: &SessionFilter,
        sort: &SessionSort,
        page: &PageRequest,
    ) -> Result<Vec<Session>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM sessions", SESSION_COLUMNS));
        push_session_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            sort.field.column(),
            sort.order.keyword()
        ));
        qb.push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<SessionRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("list sessions", e))?;

        rows.into_iter().map(Session::try_from).collect()
    }

    async fn count(&self, filter: &SessionFilter) -> Result<u64, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sessions");
        push_session_filter(&mut qb, filter);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count sessions", e))?;

        Ok(total.max(0) as u64)
    }

    async fn find_attendee(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<SessionAttendee>, DomainError> {
        let row: Option<AttendeeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM session_attendees WHERE session_id = $1 AND user_id = $2",
            ATTENDEE_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch attendee", e))?;

        Ok(row.map(SessionAttendee::from))
    }

    async fn find_attendees(&self, query: &AttendeeQuery) -> Result<Vec<SessionAttendee>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT a.session_id, a.user_id, a.reason, a.review, a.deleted_reason, \
             a.created_at, a.updated_at \
             FROM session_attendees a \
             JOIN sessions s ON s.id = a.session_id \
             WHERE s.deleted_at IS NULL",
        );
        if let Some(session_id) = &query.session_id {
            qb.push(" AND a.session_id = ").push_bind(*session_id.as_uuid());
        }
        if let Some(user_id) = &query.user_id {
            qb.push(" AND a.user_id = ").push_bind(*user_id.as_uuid());
        }
        qb.push(" ORDER BY a.created_at ASC, a.session_id ASC, a.user_id ASC LIMIT ")
            .push_bind(query.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows: Vec<AttendeeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("list attendees", e))?;

        Ok(rows.into_iter().map(SessionAttendee::from).collect())
    }

    async fn create_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError> {
        insert_attendee(&self.pool, attendee).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(ErrorCode::Conflict, "Attendee already exists")
            } else {
                database_error("insert attendee", e)
            }
        })?;
        Ok(())
    }

    async fn register_attendee(
        &self,
        attendee: &SessionAttendee,
        capacity: u32,
    ) -> Result<RegistrationOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("start transaction", e))?;

        // Row lock serializes concurrent registrations for the same session.
        let locked: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM sessions WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(attendee.session_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| database_error("lock session", e))?;

        if locked.is_none() {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", attendee.session_id),
            ));
        }

        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM session_attendees WHERE session_id = $1 AND reason IS NULL",
        )
        .bind(attendee.session_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| database_error("count attendees", e))?;

        if taken >= capacity as i64 {
            return Ok(RegistrationOutcome::CapacityReached);
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO session_attendees ({}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (session_id, user_id) DO NOTHING",
            ATTENDEE_COLUMNS
        ))
        .bind(attendee.session_id.as_uuid())
        .bind(attendee.user_id.as_uuid())
        .bind(attendee.reason.as_deref())
        .bind(attendee.review.as_deref())
        .bind(attendee.deleted_reason.as_deref())
        .bind(attendee.created_at.as_datetime())
        .bind(attendee.updated_at.as_datetime())
        .execute(&mut *tx)
        .await;

        let inserted = match inserted {
            Ok(result) => result.rows_affected(),
            Err(e) if is_unique_violation(&e) => 0,
            Err(e) => return Err(database_error("insert attendee", e)),
        };
        if inserted == 0 {
            return Ok(RegistrationOutcome::AlreadyExists);
        }

        tx.commit()
            .await
            .map_err(|e| database_error("commit registration", e))?;

        Ok(RegistrationOutcome::Registered)
    }

    async fn update_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE session_attendees SET
                reason = $3,
                review = $4,
                deleted_reason = $5,
                updated_at = $6
            WHERE session_id = $1 AND user_id = $2
            "#,
        )
        .bind(attendee.session_id.as_uuid())
        .bind(attendee.user_id.as_uuid())
        .bind(attendee.reason.as_deref())
        .bind(attendee.review.as_deref())
        .bind(attendee.deleted_reason.as_deref())
        .bind(attendee.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("update attendee", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AttendeeNotFound,
                format!(
                    "Attendee not found: {} in {}",
                    attendee.user_id, attendee.session_id
                ),
            ));
        }

        Ok(())
    }

    async fn count_attendees(&self, criteria: &AttendeeCount) -> Result<u64, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM session_attendees a \
             JOIN sessions s ON s.id = a.session_id \
             WHERE s.deleted_at IS NULL",
        );
        if let Some(session_id) = &criteria.session_id {
            qb.push(" AND a.session_id = ").push_bind(*session_id.as_uuid());
        }
        if let Some(user_id) = &criteria.user_id {
            qb.push(" AND a.user_id = ").push_bind(*user_id.as_uuid());
        }
        if let Some((start_at, end_at)) = &criteria.overlapping {
            qb.push(" AND s.start_at < ")
                .push_bind(*end_at.as_datetime())
                .push(" AND s.end_at > ")
                .push_bind(*start_at.as_datetime());
        }
        if criteria.active_only {
            qb.push(" AND a.reason IS NULL");
        }

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count attendees", e))?;

        Ok(total.max(0) as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn push_session_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &SessionFilter) {
    qb.push(" WHERE deleted_at IS NULL");
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)));
    }
    if let Some(kind) = filter.session_type {
        qb.push(" AND session_type = ").push_bind(kind.code());
    }
    if let Some(tags) = filter.tags.filter(|t| !t.is_empty()) {
        qb.push(" AND (tags & ")
            .push_bind(tags.to_mask())
            .push(") <> 0");
    }
    if let Some(before_at) = &filter.before_at {
        qb.push(" AND start_at < ").push_bind(*before_at.as_datetime());
    }
    if let Some(after_at) = &filter.after_at {
        qb.push(" AND end_at > ").push_bind(*after_at.as_datetime());
    }
    if let Some(proposer_id) = &filter.proposer_id {
        qb.push(" AND proposer_id = ").push_bind(*proposer_id.as_uuid());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.code());
    }
}

/// Escapes LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn insert_attendee(pool: &PgPool, attendee: &SessionAttendee) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO session_attendees ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        ATTENDEE_COLUMNS
    ))
    .bind(attendee.session_id.as_uuid())
    .bind(attendee.user_id.as_uuid())
    .bind(attendee.reason.as_deref())
    .bind(attendee.review.as_deref())
    .bind(attendee.deleted_reason.as_deref())
    .bind(attendee.created_at.as_datetime())
    .bind(attendee.updated_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn database_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    proposer_id: Uuid,
    title: String,
    description: Option<String>,
    session_type: i16,
    tags: i16,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    room: Option<String>,
    meeting_url: Option<String>,
    capacity: i32,
    image_uri: Option<String>,
    status: i16,
    status_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let session_type = SessionType::from_code(row.session_type).ok_or_else(|| {
            DomainError::database(format!("Invalid session type: {}", row.session_type))
        })?;
        let status = SessionStatus::from_code(row.status)
            .map_err(|e| DomainError::database(format!("Invalid session status: {}", e)))?;
        let capacity = u32::try_from(row.capacity)
            .map_err(|_| DomainError::database(format!("Invalid capacity: {}", row.capacity)))?;

        Ok(Session::reconstitute(SessionRecord {
            id: SessionId::from_uuid(row.id),
            proposer_id: UserId::from_uuid(row.proposer_id),
            title: row.title,
            description: row.description,
            session_type,
            tags: TagSet::from_mask(row.tags),
            start_at: Timestamp::from_datetime(row.start_at),
            end_at: Timestamp::from_datetime(row.end_at),
            room: row.room,
            meeting_url: row.meeting_url,
            capacity,
            image_uri: row.image_uri,
            status,
            status_reason: row.status_reason,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        }))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttendeeRow {
    session_id: Uuid,
    user_id: Uuid,
    reason: Option<String>,
    review: Option<String>,
    deleted_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendeeRow> for SessionAttendee {
    fn from(row: AttendeeRow) -> Self {
        SessionAttendee {
            session_id: SessionId::from_uuid(row.session_id),
            user_id: UserId::from_uuid(row.user_id),
            reason: row.reason,
            review: row.review,
            deleted_reason: row.deleted_reason,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}
