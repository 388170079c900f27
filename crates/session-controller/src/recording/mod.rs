//! Recording access controller.
//!
//! Authorization for viewing a finished meeting's recording. This is a
//! second-order model, distinct from live-session authorization: roster
//! membership plays no part here. The controller is read-only with respect
//! to the meeting record.
//!
//! Two orthogonal facts are reported and never conflated: whether the viewer
//! may see the recording (access), and whether a recording exists at all
//! (availability). An authorized viewer of a never-recorded meeting gets
//! `NotRecorded`, not `AccessDenied`.

use crate::errors::SessionError;
use crate::models::{Meeting, MeetingStatus};
use crate::tokens::ShareTokens;
use common::identity::{IdentityContext, PrivilegeTier};
use serde::Serialize;
use tracing::debug;

/// Access decision for a recording view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Viewer may see the recording.
    Allowed {
        /// True when access came through a share token; the UI marks these
        /// as shared/external views. No state is mutated either way.
        shared_view: bool,
    },

    /// Viewer may not see the recording.
    Denied {
        /// User-presentable reason.
        reason: String,
    },
}

/// Whether a recording exists for the meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingAvailability {
    /// Recording is stored and ready.
    Available {
        /// Recording location.
        url: String,
        /// Duration in seconds.
        duration_seconds: u32,
    },

    /// Meeting was never recorded, or the recording is still processing.
    NotRecorded,
}

/// Combined result of a recording-access evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingAccess {
    /// Allow/deny decision.
    pub decision: AccessDecision,

    /// Availability, reported independently of the decision.
    pub recording: RecordingAvailability,
}

/// Evaluate the authorization matrix for a recording view.
///
/// First matching rule wins:
/// 1. viewer's foundation owns the meeting
/// 2. viewer holds the cross-tenant administrative tier
/// 3. a share token valid for this meeting and unexpired (7-day window)
/// 4. otherwise deny
#[must_use]
pub fn recording_access(
    meeting: &Meeting,
    viewer: &IdentityContext,
    share_token: Option<&str>,
    share_tokens: &ShareTokens,
) -> RecordingAccess {
    let recording = availability(meeting);

    if viewer.foundation_id == meeting.foundation_id {
        return RecordingAccess {
            decision: AccessDecision::Allowed { shared_view: false },
            recording,
        };
    }

    if viewer.is_super_admin() {
        return RecordingAccess {
            decision: AccessDecision::Allowed { shared_view: false },
            recording,
        };
    }

    if let Some(token) = share_token {
        if share_tokens.verify(token, meeting.meeting_id) {
            return RecordingAccess {
                decision: AccessDecision::Allowed { shared_view: true },
                recording,
            };
        }
    }

    debug!(
        target: "sc.recording",
        meeting_id = %meeting.meeting_id,
        viewer = %viewer.user_id,
        "Recording access denied"
    );

    RecordingAccess {
        decision: AccessDecision::Denied {
            reason: "You do not have access to this recording".to_string(),
        },
        recording,
    }
}

fn availability(meeting: &Meeting) -> RecordingAvailability {
    match (&meeting.recording_url, meeting.recording_duration_seconds) {
        (Some(url), Some(duration_seconds)) => RecordingAvailability::Available {
            url: url.clone(),
            duration_seconds,
        },
        _ => RecordingAvailability::NotRecorded,
    }
}

/// Guard for minting a share token.
///
/// Share links are minted by the meeting host, a co-host, a same-foundation
/// administrator, or a cross-tenant administrator, and only once the meeting
/// has ended.
///
/// # Errors
///
/// `PermissionDenied` or `Conflict` (meeting not ended yet).
pub fn authorize_share_token(meeting: &Meeting, ctx: &IdentityContext) -> Result<(), SessionError> {
    let same_foundation_admin = ctx.foundation_id == meeting.foundation_id
        && ctx.privilege_tier >= PrivilegeTier::Admin;

    if !meeting.is_host_or_co_host(ctx.user_id) && !same_foundation_admin && !ctx.is_super_admin() {
        return Err(SessionError::PermissionDenied(
            "Only the host, a co-host, or an administrator can share a recording".to_string(),
        ));
    }

    if meeting.status != MeetingStatus::Ended {
        return Err(SessionError::Conflict(
            "A recording can only be shared after the meeting has ended".to_string(),
        ));
    }

    Ok(())
}

/// Recording-access result returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingAccessResponse {
    /// Whether the viewer may see the recording.
    pub allowed: bool,

    /// True when access came through a share token.
    pub shared_view: bool,

    /// Denial reason, present only when `allowed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// `available` or `not_recorded`; reported only to allowed viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_status: Option<&'static str>,

    /// Recording location, for allowed viewers of an available recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,

    /// Recording duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_duration_seconds: Option<u32>,
}

impl From<RecordingAccess> for RecordingAccessResponse {
    fn from(access: RecordingAccess) -> Self {
        match access.decision {
            AccessDecision::Denied { reason } => Self {
                allowed: false,
                shared_view: false,
                reason: Some(reason),
                recording_status: None,
                recording_url: None,
                recording_duration_seconds: None,
            },
            AccessDecision::Allowed { shared_view } => match access.recording {
                RecordingAvailability::Available {
                    url,
                    duration_seconds,
                } => Self {
                    allowed: true,
                    shared_view,
                    reason: None,
                    recording_status: Some("available"),
                    recording_url: Some(url),
                    recording_duration_seconds: Some(duration_seconds),
                },
                RecordingAvailability::NotRecorded => Self {
                    allowed: true,
                    shared_view,
                    reason: None,
                    recording_status: Some("not_recorded"),
                    recording_url: None,
                    recording_duration_seconds: None,
                },
            },
        }
    }
}
