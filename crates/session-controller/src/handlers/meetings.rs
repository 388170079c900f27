//! Meeting handlers for the Session Controller.
//!
//! Implements scheduling, lookup, lifecycle, and roster endpoints:
//!
//! - `POST /v1/meetings` - Schedule a meeting
//! - `GET  /v1/meetings/{id}` - Fetch a meeting
//! - `GET  /v1/meetings/code/{code}` - Fetch a meeting by code
//! - `POST /v1/meetings/{id}/join` - Join (or wait for host)
//! - `POST /v1/meetings/{id}/leave` - Leave
//! - `POST /v1/meetings/{id}/start` - Start (host/co-host)
//! - `POST /v1/meetings/{id}/end` - End for all (host/co-host)
//! - `POST /v1/meetings/{id}/cancel` - Cancel (host)
//! - `PUT  /v1/meetings/{id}/co-hosts` - Replace co-host set (host)
//!
//! All endpoints require the gateway identity headers; the caller context
//! is taken from request extensions.

use crate::errors::SessionError;
use crate::lifecycle::{self, MeetingAction};
use crate::models::{
    CoHostsRequest, CreateMeetingRequest, JoinRequest, JoinResponse, Meeting, MeetingResponse,
    MeetingStatus,
};
use crate::roster::{self, JoinOutcome};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use common::identity::IdentityContext;
use common::secret::ExposeSecret;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Meeting code alphabet: lowercase letters and digits, with the easily
/// confused `i`, `l`, `o`, `0`, `1` removed.
const MEETING_CODE_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Length of generated meeting codes.
const MEETING_CODE_LENGTH: usize = 10;

/// Attempts at generating a unique code before giving up.
const MEETING_CODE_RETRIES: usize = 5;

// ============================================================================
// Handler: POST /v1/meetings
// ============================================================================

/// Handler for `POST /v1/meetings`.
///
/// Schedules a meeting owned by the caller. The optional join password is
/// bcrypt-hashed before the record is stored; the plaintext never persists.
#[instrument(skip(state, ctx, request), fields(host = %ctx.user_id))]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<Json<MeetingResponse>, SessionError> {
    request
        .validate()
        .map_err(|e| SessionError::BadRequest(e.to_string()))?;

    let password_hash = match &request.password {
        Some(password) => Some(
            bcrypt::hash(password.expose_secret(), state.config.bcrypt_cost)
                .map_err(|_| SessionError::Internal)?,
        ),
        None => None,
    };

    // The host is never their own co-host.
    let mut co_hosts = request.co_hosts;
    co_hosts.remove(&ctx.user_id);

    let now = Utc::now();
    let mut meeting = Meeting {
        meeting_id: Uuid::new_v4(),
        foundation_id: ctx.foundation_id,
        title: request.title.trim().to_string(),
        description: request.description,
        host_id: ctx.user_id,
        co_hosts,
        scheduled_start_time: request.scheduled_start_time,
        scheduled_end_time: request.scheduled_end_time,
        status: MeetingStatus::Scheduled,
        participants: Vec::new(),
        password_hash,
        meeting_code: String::new(),
        recording_url: None,
        recording_duration_seconds: None,
        created_at: now,
        updated_at: now,
    };

    // Codes are random and never reused; collisions are retried.
    let mut created = false;
    for _ in 0..MEETING_CODE_RETRIES {
        meeting.meeting_code = generate_meeting_code()?;
        match state.store.create(meeting.clone()) {
            Ok(()) => {
                created = true;
                break;
            }
            Err(SessionError::Conflict(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    if !created {
        warn!(target: "sc.handlers", "Exhausted meeting code generation attempts");
        return Err(SessionError::Internal);
    }

    info!(
        target: "sc.handlers",
        meeting_id = %meeting.meeting_id,
        foundation_id = %meeting.foundation_id,
        host = %ctx.user_id,
        "Meeting scheduled"
    );

    Ok(Json(MeetingResponse::from(meeting)))
}

// ============================================================================
// Handlers: GET /v1/meetings/{id}, GET /v1/meetings/code/{code}
// ============================================================================

/// Handler for `GET /v1/meetings/{id}`.
#[instrument(skip(state), fields(meeting_id = %meeting_id))]
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = state
        .store
        .get(meeting_id)
        .await
        .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;
    Ok(Json(MeetingResponse::from(meeting)))
}

/// Handler for `GET /v1/meetings/code/{code}`.
#[instrument(skip(state), fields(meeting_code = %code))]
pub async fn get_meeting_by_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = state
        .store
        .get_by_code(&code)
        .await
        .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;
    Ok(Json(MeetingResponse::from(meeting)))
}

// ============================================================================
// Handler: POST /v1/meetings/{id}/join
// ============================================================================

/// Handler for `POST /v1/meetings/{id}/join`.
///
/// Runs the admission algorithm. A non-privileged caller against a
/// scheduled meeting receives `{"status":"waiting_for_host"}` and is
/// expected to re-attempt once the meeting goes live; transport credentials
/// are requested separately via `POST /v1/tokens`.
#[instrument(skip(state, ctx, request), fields(meeting_id = %meeting_id, identity = %ctx.user_id))]
pub async fn join_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, SessionError> {
    request
        .validate()
        .map_err(|e| SessionError::BadRequest(e.to_string()))?;

    let password = request.password.as_ref().map(|p| p.expose_secret());
    let outcome = roster::join(
        &state.store,
        meeting_id,
        &ctx,
        &request.display_name,
        request.declared_role,
        password,
    )
    .await?;

    let response = match outcome {
        JoinOutcome::Admitted { role, room_name } => JoinResponse::Admitted { role, room_name },
        JoinOutcome::WaitingForHost => JoinResponse::WaitingForHost,
    };
    Ok(Json(response))
}

// ============================================================================
// Handler: POST /v1/meetings/{id}/leave
// ============================================================================

/// Handler for `POST /v1/meetings/{id}/leave`.
///
/// Idempotent; also invoked by the UI when the transport reports a
/// disconnect.
#[instrument(skip(state, ctx), fields(meeting_id = %meeting_id, identity = %ctx.user_id))]
pub async fn leave_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, SessionError> {
    roster::leave(&state.store, meeting_id, ctx.user_id).await?;
    Ok(Json(serde_json::json!({ "left": true })))
}

// ============================================================================
// Handlers: lifecycle actions
// ============================================================================

/// Handler for `POST /v1/meetings/{id}/start`.
#[instrument(skip(state, ctx), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn start_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = state
        .store
        .mutate(meeting_id, |meeting| {
            lifecycle::transition(meeting, MeetingAction::Start, &ctx)?;
            Ok(meeting.clone())
        })
        .await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

/// Handler for `POST /v1/meetings/{id}/end`.
///
/// Ends the meeting for everyone. Participants are disconnected by the
/// transport's room teardown, not messaged individually.
#[instrument(skip(state, ctx), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn end_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = roster::end_for_all(&state.store, meeting_id, &ctx).await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

/// Handler for `POST /v1/meetings/{id}/cancel`.
#[instrument(skip(state, ctx), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn cancel_meeting(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = state
        .store
        .mutate(meeting_id, |meeting| {
            lifecycle::transition(meeting, MeetingAction::Cancel, &ctx)?;
            Ok(meeting.clone())
        })
        .await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

// ============================================================================
// Handler: PUT /v1/meetings/{id}/co-hosts
// ============================================================================

/// Handler for `PUT /v1/meetings/{id}/co-hosts`.
///
/// Replaces the co-host set. Only the host manages co-hosts; the host
/// cannot appear in their own co-host set.
#[instrument(skip(state, ctx, request), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn update_co_hosts(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
    Json(request): Json<CoHostsRequest>,
) -> Result<Json<MeetingResponse>, SessionError> {
    let meeting = state
        .store
        .mutate(meeting_id, |meeting| {
            if meeting.host_id != ctx.user_id {
                warn!(
                    target: "sc.handlers",
                    meeting_id = %meeting_id,
                    actor = %ctx.user_id,
                    "Non-host attempted to update co-hosts"
                );
                return Err(SessionError::PermissionDenied(
                    "Only the host can manage co-hosts".to_string(),
                ));
            }
            if meeting.status.is_terminal() {
                return match meeting.status {
                    MeetingStatus::Cancelled => Err(SessionError::MeetingCancelled),
                    _ => Err(SessionError::MeetingClosed),
                };
            }

            let mut co_hosts = request.co_hosts.clone();
            co_hosts.remove(&meeting.host_id);
            meeting.co_hosts = co_hosts;
            Ok(meeting.clone())
        })
        .await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

// ============================================================================
// Utility Helpers
// ============================================================================

/// Generate a random meeting code using a CSPRNG.
fn generate_meeting_code() -> Result<String, SessionError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; MEETING_CODE_LENGTH];

    rng.fill(&mut bytes).map_err(|_| {
        tracing::error!(target: "sc.handlers", "Failed to generate random bytes");
        SessionError::Internal
    })?;

    Ok(bytes
        .iter()
        .map(|b| {
            let idx = (*b as usize) % MEETING_CODE_ALPHABET.len();
            MEETING_CODE_ALPHABET.get(idx).copied().unwrap_or(b'x') as char
        })
        .collect())
}
