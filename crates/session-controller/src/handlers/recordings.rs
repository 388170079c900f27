//! Recording handlers.
//!
//! - `POST /v1/meetings/{id}/recording` - Attach a finished recording
//! - `POST /v1/meetings/{id}/share-token` - Mint a 7-day share token
//! - `GET  /v1/meetings/{id}/recording-access` - Evaluate recording access

use crate::errors::SessionError;
use crate::models::{AttachRecordingRequest, MeetingResponse, MeetingStatus, ShareTokenResponse};
use crate::recording::{self, RecordingAccessResponse};
use crate::routes::AppState;
use crate::tokens::SHARE_TOKEN_VALIDITY;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use common::identity::{IdentityContext, PrivilegeTier};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Query parameters for the recording access endpoint.
#[derive(Debug, Deserialize)]
pub struct RecordingAccessQuery {
    /// Optional share token presented by a cross-tenant viewer.
    #[serde(default)]
    pub share_token: Option<String>,
}

/// Handler for `POST /v1/meetings/{id}/recording`.
///
/// Attaches the stored recording to an ended meeting. Called by the media
/// pipeline (or an operator) once post-processing finishes; restricted to
/// the host and same-foundation administrators.
#[instrument(skip(state, ctx, request), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn attach_recording(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
    Json(request): Json<AttachRecordingRequest>,
) -> Result<Json<MeetingResponse>, SessionError> {
    if request.recording_url.trim().is_empty() {
        return Err(SessionError::BadRequest(
            "Recording URL is required".to_string(),
        ));
    }

    let meeting = state
        .store
        .mutate(meeting_id, |meeting| {
            let same_foundation_admin = ctx.foundation_id == meeting.foundation_id
                && ctx.privilege_tier >= PrivilegeTier::Admin;
            if meeting.host_id != ctx.user_id && !same_foundation_admin && !ctx.is_super_admin() {
                return Err(SessionError::PermissionDenied(
                    "Only the host or an administrator can attach a recording".to_string(),
                ));
            }

            // Recordings exist only for meetings that actually ran to completion.
            if meeting.status != MeetingStatus::Ended {
                return Err(SessionError::Conflict(
                    "A recording can only be attached to an ended meeting".to_string(),
                ));
            }

            meeting.recording_url = Some(request.recording_url.clone());
            meeting.recording_duration_seconds = Some(request.recording_duration_seconds);
            Ok(meeting.clone())
        })
        .await?;

    info!(
        target: "sc.recording",
        meeting_id = %meeting_id,
        duration_seconds = request.recording_duration_seconds,
        "Recording attached"
    );

    Ok(Json(MeetingResponse::from(meeting)))
}

/// Handler for `POST /v1/meetings/{id}/share-token`.
///
/// Mints a share token for the meeting's recording, valid for 7 days.
/// Tokens are stateless and cannot be revoked individually; a leaked link
/// expires on its own.
#[instrument(skip(state, ctx), fields(meeting_id = %meeting_id, actor = %ctx.user_id))]
pub async fn create_share_token(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<ShareTokenResponse>, SessionError> {
    let meeting = state
        .store
        .get(meeting_id)
        .await
        .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;

    recording::authorize_share_token(&meeting, &ctx)?;
    let share_token = state.share_tokens.issue(meeting_id)?;

    info!(
        target: "sc.recording",
        meeting_id = %meeting_id,
        actor = %ctx.user_id,
        "Recording share token issued"
    );

    #[allow(clippy::cast_sign_loss)]
    let expires_in = SHARE_TOKEN_VALIDITY.num_seconds() as u64;
    Ok(Json(ShareTokenResponse {
        share_token,
        expires_in,
    }))
}

/// Handler for `GET /v1/meetings/{id}/recording-access`.
///
/// Evaluates the recording authorization matrix for the caller. Always
/// returns 200 with an explicit allow/deny body; denial is an expected
/// outcome here, not an HTTP error.
#[instrument(skip(state, ctx, query), fields(meeting_id = %meeting_id, viewer = %ctx.user_id))]
pub async fn get_recording_access(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(meeting_id): Path<Uuid>,
    Query(query): Query<RecordingAccessQuery>,
) -> Result<Json<RecordingAccessResponse>, SessionError> {
    let meeting = state
        .store
        .get(meeting_id)
        .await
        .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;

    let access = recording::recording_access(
        &meeting,
        &ctx,
        query.share_token.as_deref(),
        &state.share_tokens,
    );

    Ok(Json(RecordingAccessResponse::from(access)))
}
