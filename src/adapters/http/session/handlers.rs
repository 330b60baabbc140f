//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    AcceptSessionCommand, AcceptSessionHandler, AttendeeScope, CancelSessionCommand,
    CancelSessionHandler, DeleteSessionCommand, DeleteSessionHandler, GetSessionHandler,
    GetSessionQuery, ListAttendeesHandler, ListAttendeesQuery, ListSessionsHandler,
    ListSessionsQuery, ProposeSessionCommand, ProposeSessionHandler, RegisterAttendeeCommand,
    RegisterAttendeeHandler, RejectSessionCommand, RejectSessionHandler, RemoveReviewCommand,
    RemoveReviewHandler, ReviewSessionCommand, ReviewSessionHandler, UnregisterAttendeeCommand,
    UnregisterAttendeeHandler, UpdateSessionCommand, UpdateSessionHandler,
};
use crate::domain::foundation::{AuthenticatedUser, SessionId, UserId};
use crate::domain::session::{ErrorKind, SessionDraft, SessionError, SessionPatch};
use crate::ports::{Clock, IdGenerator, SessionRepository};

use super::dto::{
    AttendeeResponse, CancelSessionRequest, ErrorResponse, ListResponse, ListSessionsParams,
    PageParams, ReasonRequest, ReviewRequest, SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    propose: Arc<ProposeSessionHandler>,
    update: Arc<UpdateSessionHandler>,
    delete: Arc<DeleteSessionHandler>,
    accept: Arc<AcceptSessionHandler>,
    reject: Arc<RejectSessionHandler>,
    cancel: Arc<CancelSessionHandler>,
    get: Arc<GetSessionHandler>,
    list: Arc<ListSessionsHandler>,
    register: Arc<RegisterAttendeeHandler>,
    unregister: Arc<UnregisterAttendeeHandler>,
    review: Arc<ReviewSessionHandler>,
    remove_review: Arc<RemoveReviewHandler>,
    attendees: Arc<ListAttendeesHandler>,
}

impl SessionHandlers {
    /// Wires every session handler against the same ports.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            propose: Arc::new(ProposeSessionHandler::new(
                repository.clone(),
                clock.clone(),
                ids,
            )),
            update: Arc::new(UpdateSessionHandler::new(repository.clone(), clock.clone())),
            delete: Arc::new(DeleteSessionHandler::new(repository.clone())),
            accept: Arc::new(AcceptSessionHandler::new(repository.clone(), clock.clone())),
            reject: Arc::new(RejectSessionHandler::new(repository.clone(), clock.clone())),
            cancel: Arc::new(CancelSessionHandler::new(repository.clone(), clock.clone())),
            get: Arc::new(GetSessionHandler::new(repository.clone())),
            list: Arc::new(ListSessionsHandler::new(repository.clone())),
            register: Arc::new(RegisterAttendeeHandler::new(
                repository.clone(),
                clock.clone(),
            )),
            unregister: Arc::new(UnregisterAttendeeHandler::new(
                repository.clone(),
                clock.clone(),
            )),
            review: Arc::new(ReviewSessionHandler::new(repository.clone(), clock.clone())),
            remove_review: Arc::new(RemoveReviewHandler::new(repository.clone(), clock)),
            attendees: Arc::new(ListAttendeesHandler::new(repository)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session endpoints
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/sessions - List sessions visible to the caller
pub async fn list_sessions(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListSessionsParams>,
) -> Response {
    let (filter, sort, page) = match params.into_parts() {
        Ok(parts) => parts,
        Err(e) => return handle_session_error(e),
    };
    let query = ListSessionsQuery {
        actor: user,
        filter,
        sort,
        page,
    };

    match handlers.list.handle(query).await {
        Ok(page) => {
            let response: ListResponse<SessionResponse> = page.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions - Propose a session
pub async fn propose_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    body: Bytes,
) -> Response {
    let draft: SessionDraft = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let cmd = ProposeSessionCommand { actor: user, draft };

    match handlers.propose.handle(cmd).await {
        Ok(session) => (StatusCode::CREATED, Json(SessionResponse::from(session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/sessions/:id - Session details with seat count
pub async fn get_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let query = GetSessionQuery {
        actor: user,
        session_id,
    };

    match handlers.get.handle(query).await {
        Ok(view) => (StatusCode::OK, Json(SessionResponse::from(view))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// PATCH /api/sessions/:id - Edit a pending proposal
pub async fn update_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let patch: SessionPatch = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = UpdateSessionCommand {
        actor: user,
        session_id,
        patch,
    };

    match handlers.update.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// DELETE /api/sessions/:id - Withdraw a pending proposal
pub async fn delete_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = DeleteSessionCommand {
        actor: user,
        session_id,
    };

    match handlers.delete.handle(cmd).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/accept - Accept with optional final edits
pub async fn accept_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let patch: SessionPatch = match optional_json(&body) {
        Ok(patch) => patch,
        Err(response) => return response,
    };
    let cmd = AcceptSessionCommand {
        actor: user,
        session_id,
        patch,
    };

    match handlers.accept.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/reject - Reject with a reason
pub async fn reject_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let req: ReasonRequest = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = RejectSessionCommand {
        actor: user,
        session_id,
        reason: req.reason,
    };

    match handlers.reject.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/cancel - Cancel an accepted session
pub async fn cancel_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req: CancelSessionRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let cmd = CancelSessionCommand {
        actor: user,
        session_id,
        reason: req.reason,
    };

    match handlers.cancel.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Attendee endpoints
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/sessions/:id/attendees - Attendees of a session
pub async fn list_session_attendees(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    list_attendees(&handlers, user, AttendeeScope::Session(session_id), params).await
}

/// GET /api/users/:id/registrations - Sessions a user registered for
pub async fn list_user_registrations(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    list_attendees(&handlers, user, AttendeeScope::User(user_id), params).await
}

async fn list_attendees(
    handlers: &SessionHandlers,
    actor: AuthenticatedUser,
    scope: AttendeeScope,
    params: PageParams,
) -> Response {
    let page = match params.into_request() {
        Ok(page) => page,
        Err(e) => return handle_session_error(e),
    };
    let query = ListAttendeesQuery { actor, scope, page };

    match handlers.attendees.handle(query).await {
        Ok(page) => {
            let response: ListResponse<AttendeeResponse> = page.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/register - Take a seat
pub async fn register_attendee(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = RegisterAttendeeCommand {
        actor: user,
        session_id,
    };

    match handlers.register.handle(cmd).await {
        Ok(attendee) => {
            (StatusCode::CREATED, Json(AttendeeResponse::from(attendee))).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/unregister - Give the seat back
pub async fn unregister_attendee(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let req: ReasonRequest = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = UnregisterAttendeeCommand {
        actor: user,
        session_id,
        reason: req.reason,
    };

    match handlers.unregister.handle(cmd).await {
        Ok(attendee) => (StatusCode::OK, Json(AttendeeResponse::from(attendee))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/review - Review an attended session
pub async fn review_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let req: ReviewRequest = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = ReviewSessionCommand {
        actor: user,
        session_id,
        review: req.review,
    };

    match handlers.review.handle(cmd).await {
        Ok(attendee) => (StatusCode::OK, Json(AttendeeResponse::from(attendee))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/reviews/:user_id/remove - Moderate a review
pub async fn remove_review(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path((session_id, user_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let req: ReasonRequest = match required_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let cmd = RemoveReviewCommand {
        actor: user,
        session_id,
        user_id,
        reason: req.reason,
    };

    match handlers.remove_review.handle(cmd).await {
        Ok(attendee) => (StatusCode::OK, Json(AttendeeResponse::from(attendee))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    raw.parse::<UserId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid user ID")),
        )
            .into_response()
    })
}

/// An empty body means the default value.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    required_json(body)
}

/// Parses a JSON body. A missing field becomes a 422 violation on that
/// field; any other decoding error is a 400.
fn required_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        if let Some(field) = missing_field(&e) {
            return handle_session_error(SessionError::validation(field, "is required"));
        }
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid JSON body: {}", e))),
        )
            .into_response()
    })
}

fn missing_field(error: &serde_json::Error) -> Option<String> {
    if !error.is_data() {
        return None;
    }
    let message = error.to_string();
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next().map(str::to_string)
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_session_error(error: SessionError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if error.kind() == ErrorKind::Internal {
        tracing::error!(error = %error, "Session request failed");
        return (status, Json(ErrorResponse::internal())).into_response();
    }

    (status, Json(ErrorResponse::from(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_session_error(SessionError::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_map_to_409() {
        let response = handle_session_error(SessionError::AlreadyRegistered);
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let response = handle_session_error(SessionError::ProposalLimit);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn business_rule_maps_to_400() {
        let response = handle_session_error(SessionError::Full);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let response = handle_session_error(SessionError::Forbidden);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_failed_maps_to_422() {
        let response = handle_session_error(SessionError::validation("title", "too short"));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let response = handle_session_error(SessionError::infrastructure("connection reset"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_body_yields_default() {
        let patch: SessionPatch = optional_json(&Bytes::new()).unwrap();
        assert!(patch.is_empty());
        let req: CancelSessionRequest = optional_json(&Bytes::from_static(b"{\"reason\":\"Venue closed\"}")).unwrap();
        assert_eq!(req.reason.as_deref(), Some("Venue closed"));
    }

    #[test]
    fn missing_required_field_is_a_violation() {
        let result: Result<ReasonRequest, Response> = required_json(&Bytes::from_static(b"{}"));
        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let result: Result<ReviewRequest, Response> =
            required_json(&Bytes::from_static(b"{\"review\":\"Great talk\"}"));
        assert_eq!(result.unwrap().review, "Great talk");
    }

    #[test]
    fn wrong_type_in_required_body_is_400() {
        let result: Result<ReasonRequest, Response> =
            required_json(&Bytes::from_static(b"{\"reason\":42}"));
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_body_is_400() {
        let result: Result<SessionPatch, Response> = optional_json(&Bytes::from_static(b"{nope"));
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
