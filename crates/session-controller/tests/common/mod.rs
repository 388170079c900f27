//! Shared helpers for router-level integration tests.
//!
//! Builds the full application router against an in-memory store and a
//! low-cost bcrypt configuration, and drives it with `tower::ServiceExt`.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use session_controller::config::Config;
use session_controller::routes::{build_routes, AppState};
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// An identity the gateway would stamp on a request.
#[derive(Debug, Clone)]
pub struct TestIdentity {
    pub user_id: Uuid,
    pub foundation_id: Uuid,
    pub tier: &'static str,
}

impl TestIdentity {
    pub fn member(foundation_id: Uuid) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            foundation_id,
            tier: "member",
        }
    }

    pub fn staff(foundation_id: Uuid) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            foundation_id,
            tier: "staff",
        }
    }

    pub fn admin(foundation_id: Uuid) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            foundation_id,
            tier: "admin",
        }
    }

    pub fn super_admin(foundation_id: Uuid) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            foundation_id,
            tier: "super_admin",
        }
    }
}

/// Build the application router with test configuration.
///
/// Uses the minimum bcrypt cost so password tests stay fast.
pub fn test_router() -> Router {
    let vars = HashMap::from([
        ("TRANSPORT_API_KEY".to_string(), "test-key".to_string()),
        (
            "TRANSPORT_API_SECRET".to_string(),
            "test-transport-secret".to_string(),
        ),
        (
            "SHARE_TOKEN_SECRET".to_string(),
            "test-share-secret".to_string(),
        ),
        ("BCRYPT_COST".to_string(), "4".to_string()),
    ]);
    let config = Config::from_vars(&vars).expect("test config should load");
    build_routes(Arc::new(AppState::new(config)))
}

/// Build a request carrying the gateway identity headers.
pub fn request(
    method: Method,
    uri: &str,
    identity: &TestIdentity,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", identity.user_id.to_string())
        .header("x-foundation-id", identity.foundation_id.to_string())
        .header("x-privilege-tier", identity.tier);

    match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Build a request with no identity headers at all.
pub fn anonymous_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Drive a single request through the router.
pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

/// Schedule a meeting through the API and return its JSON representation.
pub async fn schedule_meeting(
    app: &Router,
    host: &TestIdentity,
    password: Option<&str>,
    co_hosts: &[Uuid],
) -> serde_json::Value {
    let now = chrono::Utc::now();
    let mut body = serde_json::json!({
        "title": "Scholarship committee review",
        "scheduled_start_time": now,
        "scheduled_end_time": now + chrono::Duration::hours(1),
        "co_hosts": co_hosts,
    });
    if let Some(password) = password {
        body["password"] = serde_json::json!(password);
    }

    let response = send(app, request(Method::POST, "/v1/meetings", host, Some(body))).await;
    assert_eq!(response.status(), 200, "meeting creation should succeed");
    body_json(response).await
}
