//! Session Controller models.
//!
//! Domain types for meetings and participants, plus the request/response
//! types for the HTTP surface. The meeting record is the single shared
//! mutable resource in this service; everything else is derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Maximum meeting title length.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum display name length for participants.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Minimum display name length for participants.
pub const MIN_DISPLAY_NAME_LENGTH: usize = 2;

/// Meeting status enumeration.
///
/// Transitions are monotonic: `scheduled -> live -> ended` or
/// `scheduled -> cancelled`. `ended` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Meeting is scheduled but not yet active.
    Scheduled,

    /// Meeting is currently in progress.
    Live,

    /// Meeting has ended normally.
    Ended,

    /// Meeting was cancelled before it started.
    Cancelled,
}

impl MeetingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Live => "live",
            MeetingStatus::Ended => "ended",
            MeetingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, MeetingStatus::Ended | MeetingStatus::Cancelled)
    }
}

/// Meeting-local role of a participant session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingRole {
    /// Meeting owner.
    Host,

    /// Host-designated co-host.
    CoHost,

    /// Elevated participant (review staff), no room administration.
    Moderator,

    /// Regular participant.
    Participant,
}

impl MeetingRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingRole::Host => "host",
            MeetingRole::CoHost => "co_host",
            MeetingRole::Moderator => "moderator",
            MeetingRole::Participant => "participant",
        }
    }
}

/// A live roster entry. Ephemeral: exists only while the identity is joined
/// to the session, never persisted as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSession {
    /// Authenticated identity of the participant.
    pub identity: Uuid,

    /// Display name shown to other participants.
    pub display_name: String,

    /// Role derived at join time.
    pub role: MeetingRole,

    /// When this identity joined (updated on reconnect).
    pub joined_at: DateTime<Utc>,
}

/// Durable meeting record.
///
/// The roster is embedded on the record rather than stored separately,
/// reflecting that it is live-session state rather than historical data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// Unique meeting identifier.
    pub meeting_id: Uuid,

    /// Foundation (tenant) that owns the meeting.
    pub foundation_id: Uuid,

    /// Meeting title.
    pub title: String,

    /// Optional longer description.
    pub description: Option<String>,

    /// Owning identity. Immutable after creation.
    pub host_id: Uuid,

    /// Host-managed set of co-hosts.
    pub co_hosts: HashSet<Uuid>,

    /// Scheduled start of the meeting window.
    pub scheduled_start_time: DateTime<Utc>,

    /// Scheduled end of the meeting window.
    pub scheduled_end_time: DateTime<Utc>,

    /// Current lifecycle status.
    pub status: MeetingStatus,

    /// Live roster; each identity appears at most once.
    pub participants: Vec<ParticipantSession>,

    /// Bcrypt hash of the optional join password. Plaintext is never stored.
    pub password_hash: Option<String>,

    /// Unique human-shareable lookup code.
    pub meeting_code: String,

    /// Recording location, set only after the meeting has ended.
    pub recording_url: Option<String>,

    /// Recording duration in seconds, set with `recording_url`.
    pub recording_duration_seconds: Option<u32>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// Whether the identity is the host or a co-host.
    #[must_use]
    pub fn is_host_or_co_host(&self, identity: Uuid) -> bool {
        self.host_id == identity || self.co_hosts.contains(&identity)
    }

    /// Look up the roster entry for an identity, if joined.
    #[must_use]
    pub fn participant(&self, identity: Uuid) -> Option<&ParticipantSession> {
        self.participants.iter().find(|p| p.identity == identity)
    }
}

// ============================================================================
// Request/Response Models
// ============================================================================

/// Request to schedule a new meeting.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMeetingRequest {
    /// Meeting title.
    pub title: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Scheduled start of the meeting window.
    pub scheduled_start_time: DateTime<Utc>,

    /// Scheduled end of the meeting window.
    pub scheduled_end_time: DateTime<Utc>,

    /// Optional join password. Hashed at creation; never stored in clear.
    #[serde(default)]
    pub password: Option<common::secret::SecretString>,

    /// Initial co-host set.
    #[serde(default)]
    pub co_hosts: HashSet<Uuid>,
}

impl CreateMeetingRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        let title = self.title.trim();

        if title.is_empty() {
            return Err("Title is required");
        }

        if title.len() > MAX_TITLE_LENGTH {
            return Err("Title must be at most 200 characters");
        }

        if self.scheduled_end_time <= self.scheduled_start_time {
            return Err("Scheduled end time must be after start time");
        }

        Ok(())
    }
}

/// Request to join a meeting.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinRequest {
    /// Display name to show on the roster.
    pub display_name: String,

    /// Caller-declared intended role. Downgraded to `participant` unless the
    /// caller's privilege tier supports it.
    #[serde(default)]
    pub declared_role: Option<MeetingRole>,

    /// Join password, if the meeting has one.
    #[serde(default)]
    pub password: Option<common::secret::SecretString>,
}

impl JoinRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        let display_name = self.display_name.trim();

        if display_name.len() < MIN_DISPLAY_NAME_LENGTH {
            return Err("Display name must be at least 2 characters");
        }

        if display_name.len() > MAX_DISPLAY_NAME_LENGTH {
            return Err("Display name must be at most 100 characters");
        }

        Ok(())
    }
}

/// Response for a join attempt.
///
/// "Waiting for host" is a first-class outcome, not an error: the caller is
/// expected to keep watching the meeting rather than retrying blindly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JoinResponse {
    /// Caller was admitted to the session.
    Admitted {
        /// Role derived for this session.
        role: MeetingRole,
        /// Transport room all participants of this meeting share.
        room_name: String,
    },

    /// Meeting is still `scheduled` and the caller is not privileged to
    /// start it; re-evaluate when the meeting changes.
    WaitingForHost,
}

/// Request to replace the co-host set. Host only.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoHostsRequest {
    /// New co-host set.
    pub co_hosts: HashSet<Uuid>,
}

/// Request to attach a finished recording to an ended meeting.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachRecordingRequest {
    /// Location of the stored recording.
    pub recording_url: String,

    /// Duration of the recording in seconds.
    pub recording_duration_seconds: u32,
}

/// Request for a transport grant.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    /// Transport room to grant access to.
    pub room_name: String,

    /// Display name embedded in the grant.
    pub display_name: String,

    /// Role the grant's capabilities are derived from.
    pub role: MeetingRole,
}

/// Response carrying a freshly issued share token for a recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTokenResponse {
    /// Opaque share token.
    pub share_token: String,

    /// Token validity in seconds from now.
    pub expires_in: u64,
}

/// Meeting representation returned to clients. Excludes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingResponse {
    /// Meeting ID.
    pub meeting_id: Uuid,

    /// Owning foundation.
    pub foundation_id: Uuid,

    /// Meeting title.
    pub title: String,

    /// Optional description.
    pub description: Option<String>,

    /// Owning identity.
    pub host_id: Uuid,

    /// Co-host set.
    pub co_hosts: HashSet<Uuid>,

    /// Scheduled start of the meeting window.
    pub scheduled_start_time: DateTime<Utc>,

    /// Scheduled end of the meeting window.
    pub scheduled_end_time: DateTime<Utc>,

    /// Current status.
    pub status: MeetingStatus,

    /// Live roster.
    pub participants: Vec<ParticipantSession>,

    /// Whether a join password is set.
    pub has_password: bool,

    /// Human-shareable lookup code.
    pub meeting_code: String,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        Self {
            meeting_id: meeting.meeting_id,
            foundation_id: meeting.foundation_id,
            title: meeting.title,
            description: meeting.description,
            host_id: meeting.host_id,
            co_hosts: meeting.co_hosts,
            scheduled_start_time: meeting.scheduled_start_time,
            scheduled_end_time: meeting.scheduled_end_time,
            status: meeting.status,
            participants: meeting.participants,
            has_password: meeting.password_hash.is_some(),
            meeting_code: meeting.meeting_code,
            updated_at: meeting.updated_at,
        }
    }
}

/// Health check response for `/v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy").
    pub status: String,
}

// ============================================================================
// Test Helpers
// ============================================================================

#[cfg(test)]
pub(crate) fn test_meeting(host_id: Uuid, foundation_id: Uuid) -> Meeting {
    let now = Utc::now();
    Meeting {
        meeting_id: Uuid::new_v4(),
        foundation_id,
        title: "Scholarship review".to_string(),
        description: None,
        host_id,
        co_hosts: HashSet::new(),
        scheduled_start_time: now,
        scheduled_end_time: now + chrono::Duration::hours(1),
        status: MeetingStatus::Scheduled,
        participants: Vec::new(),
        password_hash: None,
        meeting_code: "test-code".to_string(),
        recording_url: None,
        recording_duration_seconds: None,
        created_at: now,
        updated_at: now,
    }
}
