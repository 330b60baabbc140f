//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    accept_session, cancel_session, delete_session, get_session, list_session_attendees,
    list_sessions, list_user_registrations, propose_session, register_attendee, reject_session,
    remove_review, review_session, unregister_attendee, update_session, SessionHandlers,
};

/// Creates the session router, mounted under `/api/sessions`.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/", get(list_sessions).post(propose_session))
        .route(
            "/:id",
            get(get_session).patch(update_session).delete(delete_session),
        )
        .route("/:id/accept", post(accept_session))
        .route("/:id/reject", post(reject_session))
        .route("/:id/cancel", post(cancel_session))
        .route("/:id/attendees", get(list_session_attendees))
        .route("/:id/register", post(register_attendee))
        .route("/:id/unregister", post(unregister_attendee))
        .route("/:id/review", post(review_session))
        .route("/:id/reviews/:user_id/remove", post(remove_review))
        .with_state(handlers)
}

/// Creates the per-user router, mounted under `/api/users`.
pub fn user_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/:id/registrations", get(list_user_registrations))
        .with_state(handlers)
}
