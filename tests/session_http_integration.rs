//! HTTP integration tests for the session API.
//!
//! These tests verify:
//! - Bearer authentication is enforced on every `/api` route
//! - Domain errors map to the documented status codes and error codes
//! - The propose, accept, register flow works end to end over JSON

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use conference_sessions::adapters::auth::MockSessionValidator;
use conference_sessions::adapters::http::{api_router, ApiDependencies, HttpSettings};
use conference_sessions::adapters::memory::InMemorySessionRepository;
use conference_sessions::adapters::system::{ManualClock, UuidV7Generator};
use conference_sessions::domain::foundation::{AuthenticatedUser, Timestamp, UserId};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SPEAKER: &str = "speaker-token";
const ATTENDEE: &str = "attendee-token";
const COORDINATOR: &str = "coordinator-token";

struct TestApp {
    router: Router,
    attendee_id: UserId,
    start: Timestamp,
}

impl TestApp {
    fn new() -> Self {
        let start = Timestamp::now().plus_hours(24);
        let attendee_id = UserId::random();
        let validator = MockSessionValidator::new()
            .with_user(SPEAKER, AuthenticatedUser::user(UserId::random()))
            .with_user(ATTENDEE, AuthenticatedUser::user(attendee_id))
            .with_user(COORDINATOR, AuthenticatedUser::coordinator(UserId::random()));

        let deps = ApiDependencies {
            repository: Arc::new(InMemorySessionRepository::new()),
            clock: Arc::new(ManualClock::new(start.minus_hours(24))),
            ids: Arc::new(UuidV7Generator),
            validator: Arc::new(validator),
        };

        Self {
            router: api_router(deps, &HttpSettings::default()),
            attendee_id,
            start,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn proposal(&self, title: &str) -> Value {
        json!({
            "title": title,
            "description": "Practical ownership patterns",
            "type": 1,
            "tags": ["BE", "NOPE"],
            "start_at": self.start.to_rfc3339(),
            "end_at": self.start.plus_hours(1).to_rfc3339(),
            "room": "Hall A",
            "capacity": 2
        })
    }

    async fn propose(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/api/sessions", Some(token), Some(self.proposal(title)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn health_is_public_and_api_requires_a_token() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = app.send(Method::GET, "/api/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::GET, "/api/sessions", Some("forged"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_ERROR");
}

// =============================================================================
// Lifecycle over HTTP
// =============================================================================

#[tokio::test]
async fn propose_accept_register_flow() {
    let app = TestApp::new();
    let id = app.propose(SPEAKER, "Ownership in practice").await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/sessions/{id}"), Some(SPEAKER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["tags"], json!(["BE"]));

    // Pending sessions are hidden from other regular users.
    let (status, _) = app
        .send(Method::GET, &format!("/api/sessions/{id}"), Some(ATTENDEE), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let register = format!("/api/sessions/{id}/register");
    let (status, body) = app.send(Method::POST, &register, Some(ATTENDEE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SESSION_NOT_ACCEPTED");

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/sessions/{id}/accept"),
            Some(COORDINATOR),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, body) = app.send(Method::POST, &register, Some(ATTENDEE), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "registered");

    let (status, body) = app.send(Method::POST, &register, Some(ATTENDEE), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SESSION_ALREADY_REGISTERED");

    let (status, body) = app
        .send(Method::GET, &format!("/api/sessions/{id}"), Some(ATTENDEE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendee_count"], 1);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/users/{}/registrations", app.attendee_id),
            Some(ATTENDEE),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total_data"], 1);
    assert_eq!(body["data"][0]["session_id"], id.as_str());

    // Someone else's registrations are off limits.
    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/users/{}/registrations", app.attendee_id),
            Some(SPEAKER),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn second_pending_proposal_is_a_conflict() {
    let app = TestApp::new();
    app.propose(SPEAKER, "First idea").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/sessions",
            Some(SPEAKER),
            Some(app.proposal("Second idea")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SESSION_PROPOSAL_LIMIT");
}

#[tokio::test]
async fn regular_users_cannot_moderate() {
    let app = TestApp::new();
    let id = app.propose(SPEAKER, "Needs review").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/sessions/{id}/reject"),
            Some(SPEAKER),
            Some(json!({ "reason": "Not a fit" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn proposer_may_withdraw_only_pending_sessions() {
    let app = TestApp::new();
    let id = app.propose(SPEAKER, "Short lived").await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/sessions/{id}"), Some(ATTENDEE), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/sessions/{id}"), Some(SPEAKER), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app
        .send(Method::GET, &format!("/api/sessions/{id}"), Some(COORDINATOR), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SESSION_NOT_FOUND");

    // The withdrawn proposal no longer counts toward the pending limit.
    let id = app.propose(SPEAKER, "Second attempt").await;
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/sessions/{id}/reject"),
            Some(COORDINATOR),
            Some(json!({ "reason": "Out of scope" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["status_reason"], "Out of scope");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/sessions/{id}"), Some(SPEAKER), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SESSION_CANNOT_BE_DELETED");
}

// =============================================================================
// Input errors
// =============================================================================

#[tokio::test]
async fn invalid_proposal_lists_violations() {
    let app = TestApp::new();
    let mut proposal = app.proposal("ab");
    proposal["capacity"] = json!(0);

    let (status, body) = app
        .send(Method::POST, "/api/sessions", Some(SPEAKER), Some(proposal))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["field"].as_str())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"capacity"));
}

#[tokio::test]
async fn missing_required_body_field_is_reported_per_field() {
    let app = TestApp::new();
    let mut proposal = app.proposal("Untitled");
    proposal.as_object_mut().unwrap().remove("title");

    let (status, body) = app
        .send(Method::POST, "/api/sessions", Some(SPEAKER), Some(proposal))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["violations"][0]["field"], "title");

    let id = app.propose(SPEAKER, "Needs a reason").await;
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/sessions/{id}/reject"),
            Some(COORDINATOR),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "reason");
}

#[tokio::test]
async fn malformed_ids_and_unknown_sessions() {
    let app = TestApp::new();

    let (status, _) = app
        .send(Method::GET, "/api/sessions/not-a-uuid", Some(ATTENDEE), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/sessions/{unknown}"),
            Some(ATTENDEE),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn listing_rejects_out_of_range_paging() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/sessions?limit=500", Some(ATTENDEE), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "limit");

    let (status, body) = app
        .send(
            Method::GET,
            "/api/sessions?status=2&page=1&limit=5",
            Some(ATTENDEE),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["limit"], 5);
    assert_eq!(body["data"], json!([]));
}
