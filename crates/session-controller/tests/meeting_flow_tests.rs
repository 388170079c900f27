//! Meeting lifecycle and roster integration tests.
//!
//! Drives the full router: schedule, lookup, join scenarios, lifecycle
//! actions, and co-host management, all through the HTTP surface.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::Method;
use common::{body_json, request, schedule_meeting, send, test_router, TestIdentity};
use uuid::Uuid;

fn join_body(display_name: &str) -> serde_json::Value {
    serde_json::json!({ "display_name": display_name })
}

#[tokio::test]
async fn test_schedule_meeting_returns_scheduled_record() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;

    assert_eq!(meeting["status"], "scheduled");
    assert_eq!(meeting["host_id"], host.user_id.to_string());
    assert_eq!(meeting["foundation_id"], host.foundation_id.to_string());
    assert_eq!(meeting["has_password"], false);
    assert_eq!(meeting["participants"], serde_json::json!([]));

    let code = meeting["meeting_code"].as_str().unwrap();
    assert_eq!(code.len(), 10);
}

#[tokio::test]
async fn test_schedule_meeting_rejects_invalid_window() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());
    let now = chrono::Utc::now();

    let body = serde_json::json!({
        "title": "Backwards meeting",
        "scheduled_start_time": now,
        "scheduled_end_time": now - chrono::Duration::minutes(10),
    });
    let response = send(
        &app,
        request(Method::POST, "/v1/meetings", &host, Some(body)),
    )
    .await;

    assert_eq!(response.status(), 400);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_fetch_by_id_and_code() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap();
    let code = meeting["meeting_code"].as_str().unwrap();

    let by_id = send(
        &app,
        request(Method::GET, &format!("/v1/meetings/{id}"), &host, None),
    )
    .await;
    assert_eq!(by_id.status(), 200);

    let by_code = send(
        &app,
        request(Method::GET, &format!("/v1/meetings/code/{code}"), &host, None),
    )
    .await;
    assert_eq!(by_code.status(), 200);
    assert_eq!(body_json(by_code).await["meeting_id"], id);
}

#[tokio::test]
async fn test_fetch_unknown_meeting_returns_404() {
    let app = test_router();
    let caller = TestIdentity::member(Uuid::new_v4());

    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/v1/meetings/{}", Uuid::new_v4()),
            &caller,
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_participant_waits_until_host_joins() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let participant = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();
    let join_uri = format!("/v1/meetings/{id}/join");

    // Participant arrives early: parked, not admitted.
    let early = send(
        &app,
        request(Method::POST, &join_uri, &participant, Some(join_body("Priya"))),
    )
    .await;
    assert_eq!(early.status(), 200);
    assert_eq!(body_json(early).await["status"], "waiting_for_host");

    // Host joining takes the meeting live.
    let host_join = send(
        &app,
        request(Method::POST, &join_uri, &host, Some(join_body("Hana"))),
    )
    .await;
    let host_outcome = body_json(host_join).await;
    assert_eq!(host_outcome["status"], "admitted");
    assert_eq!(host_outcome["role"], "host");

    // Participant's retry now succeeds, landing in the same room.
    let retry = send(
        &app,
        request(Method::POST, &join_uri, &participant, Some(join_body("Priya"))),
    )
    .await;
    let outcome = body_json(retry).await;
    assert_eq!(outcome["status"], "admitted");
    assert_eq!(outcome["role"], "participant");
    assert_eq!(outcome["room_name"], host_outcome["room_name"]);

    let fetched = send(
        &app,
        request(Method::GET, &format!("/v1/meetings/{id}"), &host, None),
    )
    .await;
    let fetched = body_json(fetched).await;
    assert_eq!(fetched["status"], "live");
    assert_eq!(fetched["participants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_co_host_join_auto_starts() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let co_host = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[co_host.user_id]).await;
    let id = meeting["meeting_id"].as_str().unwrap();

    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/join"),
            &co_host,
            Some(join_body("Casey")),
        ),
    )
    .await;
    let outcome = body_json(response).await;
    assert_eq!(outcome["status"], "admitted");
    assert_eq!(outcome["role"], "co_host");

    let fetched = send(
        &app,
        request(Method::GET, &format!("/v1/meetings/{id}"), &host, None),
    )
    .await;
    assert_eq!(body_json(fetched).await["status"], "live");
}

#[tokio::test]
async fn test_password_protected_join() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let participant = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, Some("hunter2"), &[]).await;
    assert_eq!(meeting["has_password"], true);
    let id = meeting["meeting_id"].as_str().unwrap().to_string();
    let join_uri = format!("/v1/meetings/{id}/join");

    // Host goes live first (hosts still satisfy the password gate).
    let host_join = send(
        &app,
        request(
            Method::POST,
            &join_uri,
            &host,
            Some(serde_json::json!({ "display_name": "Hana", "password": "hunter2" })),
        ),
    )
    .await;
    assert_eq!(host_join.status(), 200);

    let wrong = send(
        &app,
        request(
            Method::POST,
            &join_uri,
            &participant,
            Some(serde_json::json!({ "display_name": "Priya", "password": "letmein" })),
        ),
    )
    .await;
    assert_eq!(wrong.status(), 401);
    assert_eq!(body_json(wrong).await["error"]["code"], "INVALID_PASSWORD");

    let right = send(
        &app,
        request(
            Method::POST,
            &join_uri,
            &participant,
            Some(serde_json::json!({ "display_name": "Priya", "password": "hunter2" })),
        ),
    )
    .await;
    assert_eq!(right.status(), 200);
    assert_eq!(body_json(right).await["status"], "admitted");
}

#[tokio::test]
async fn test_moderator_role_requires_staff_tier() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let reviewer = TestIdentity::staff(foundation);
    let member = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();
    let join_uri = format!("/v1/meetings/{id}/join");

    send(
        &app,
        request(Method::POST, &join_uri, &host, Some(join_body("Hana"))),
    )
    .await;

    let moderator_body =
        serde_json::json!({ "display_name": "Reviewer", "declared_role": "moderator" });

    let staff_join = send(
        &app,
        request(Method::POST, &join_uri, &reviewer, Some(moderator_body.clone())),
    )
    .await;
    assert_eq!(body_json(staff_join).await["role"], "moderator");

    // A plain member declaring moderator is quietly downgraded.
    let member_join = send(
        &app,
        request(Method::POST, &join_uri, &member, Some(moderator_body)),
    )
    .await;
    assert_eq!(body_json(member_join).await["role"], "participant");
}

#[tokio::test]
async fn test_end_meeting_clears_roster_and_blocks_rejoin() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let participant = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();
    let join_uri = format!("/v1/meetings/{id}/join");

    send(
        &app,
        request(Method::POST, &join_uri, &host, Some(join_body("Hana"))),
    )
    .await;
    send(
        &app,
        request(Method::POST, &join_uri, &participant, Some(join_body("Priya"))),
    )
    .await;

    let ended = send(
        &app,
        request(Method::POST, &format!("/v1/meetings/{id}/end"), &host, None),
    )
    .await;
    assert_eq!(ended.status(), 200);
    let ended = body_json(ended).await;
    assert_eq!(ended["status"], "ended");
    assert_eq!(ended["participants"], serde_json::json!([]));

    let rejoin = send(
        &app,
        request(Method::POST, &join_uri, &participant, Some(join_body("Priya"))),
    )
    .await;
    assert_eq!(rejoin.status(), 410);
    assert_eq!(body_json(rejoin).await["error"]["code"], "MEETING_CLOSED");
}

#[tokio::test]
async fn test_only_host_or_co_host_can_end() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let participant = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/join"),
            &host,
            Some(join_body("Hana")),
        ),
    )
    .await;

    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/end"),
            &participant,
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_cancel_scheduled_meeting() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    let cancelled = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/cancel"),
            &host,
            None,
        ),
    )
    .await;
    assert_eq!(cancelled.status(), 200);
    assert_eq!(body_json(cancelled).await["status"], "cancelled");

    let join = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/join"),
            &host,
            Some(join_body("Hana")),
        ),
    )
    .await;
    assert_eq!(join.status(), 410);
    assert_eq!(body_json(join).await["error"]["code"], "MEETING_CANCELLED");
}

#[tokio::test]
async fn test_cancel_live_meeting_conflicts() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/start"),
            &host,
            None,
        ),
    )
    .await;

    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/cancel"),
            &host,
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_leave_is_idempotent_over_http() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/join"),
            &host,
            Some(join_body("Hana")),
        ),
    )
    .await;

    for _ in 0..2 {
        let response = send(
            &app,
            request(
                Method::POST,
                &format!("/v1/meetings/{id}/leave"),
                &host,
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), 200);
    }

    let fetched = send(
        &app,
        request(Method::GET, &format!("/v1/meetings/{id}"), &host, None),
    )
    .await;
    let fetched = body_json(fetched).await;
    assert_eq!(fetched["participants"], serde_json::json!([]));
    // A leave never changes meeting status.
    assert_eq!(fetched["status"], "live");
}

#[tokio::test]
async fn test_co_host_management_is_host_only() {
    let app = test_router();
    let foundation = Uuid::new_v4();
    let host = TestIdentity::member(foundation);
    let other = TestIdentity::member(foundation);
    let new_co_host = Uuid::new_v4();

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();
    let uri = format!("/v1/meetings/{id}/co-hosts");
    let body = serde_json::json!({ "co_hosts": [new_co_host] });

    let denied = send(&app, request(Method::PUT, &uri, &other, Some(body.clone()))).await;
    assert_eq!(denied.status(), 403);

    let updated = send(&app, request(Method::PUT, &uri, &host, Some(body))).await;
    assert_eq!(updated.status(), 200);
    let updated = body_json(updated).await;
    assert_eq!(
        updated["co_hosts"],
        serde_json::json!([new_co_host.to_string()])
    );
}

#[tokio::test]
async fn test_host_stripped_from_own_co_host_set() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        request(
            Method::PUT,
            &format!("/v1/meetings/{id}/co-hosts"),
            &host,
            Some(serde_json::json!({ "co_hosts": [host.user_id] })),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["co_hosts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_transport_grant_issued_after_admission() {
    let app = test_router();
    let host = TestIdentity::member(Uuid::new_v4());

    let meeting = schedule_meeting(&app, &host, None, &[]).await;
    let id = meeting["meeting_id"].as_str().unwrap().to_string();

    let join = send(
        &app,
        request(
            Method::POST,
            &format!("/v1/meetings/{id}/join"),
            &host,
            Some(join_body("Hana")),
        ),
    )
    .await;
    let join = body_json(join).await;
    let room_name = join["room_name"].as_str().unwrap();

    let response = send(
        &app,
        request(
            Method::POST,
            "/v1/tokens",
            &host,
            Some(serde_json::json!({
                "room_name": room_name,
                "display_name": "Hana",
                "role": "host",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);

    let grant = body_json(response).await;
    assert!(!grant["token"].as_str().unwrap().is_empty());
    assert_eq!(grant["transport_url"], "wss://localhost:7880");
    assert_eq!(grant["expires_in"], 900);
}
