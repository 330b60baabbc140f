//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AttendeeResponse, CancelSessionRequest, ErrorResponse, ListResponse, ListSessionsParams,
    PageParams, ReasonRequest, ReviewRequest, SessionResponse,
};
pub use handlers::SessionHandlers;
pub use routes::{session_routes, user_routes};
