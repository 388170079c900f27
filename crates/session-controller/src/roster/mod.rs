//! Membership coordinator.
//!
//! Owns the live roster: join, leave, and end-for-all. All roster writes run
//! inside [`MeetingStore::mutate`], so the status guard and the roster
//! upsert are one atomic step — a join that was pending while the meeting
//! ended is rejected with `MeetingClosed`, never committed against stale
//! state.
//!
//! Roster membership and transport credentialing are deliberately decoupled:
//! a successful join is not rolled back if token issuance fails afterwards.
//! Callers retry the token step alone.

use crate::errors::SessionError;
use crate::lifecycle::{self, MeetingAction};
use crate::models::{Meeting, MeetingRole, MeetingStatus, ParticipantSession};
use crate::store::MeetingStore;
use chrono::Utc;
use common::identity::{IdentityContext, PrivilegeTier};
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a join attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Caller is on the roster and may request a transport grant.
    Admitted {
        /// Role derived for this session.
        role: MeetingRole,
        /// Transport room shared by all participants of the meeting.
        room_name: String,
    },

    /// Meeting is scheduled and the caller cannot start it; the caller
    /// should watch the meeting and re-attempt once it goes live.
    WaitingForHost,
}

/// Derive the effective meeting role for a caller.
///
/// Precedence is fixed here so role logic is not scattered across call
/// sites: host beats co-host beats a declared moderator role (honored only
/// for review staff and above); everyone else is a participant. A declared
/// `host` or `co_host` is never honored.
#[must_use]
pub fn derive_role(
    meeting: &Meeting,
    ctx: &IdentityContext,
    declared: Option<MeetingRole>,
) -> MeetingRole {
    if meeting.host_id == ctx.user_id {
        return MeetingRole::Host;
    }
    if meeting.co_hosts.contains(&ctx.user_id) {
        return MeetingRole::CoHost;
    }
    if declared == Some(MeetingRole::Moderator) && ctx.privilege_tier >= PrivilegeTier::Staff {
        return MeetingRole::Moderator;
    }
    MeetingRole::Participant
}

/// Deterministic transport room name for a meeting.
///
/// Stable across joins so every participant of the meeting lands in the
/// same transport room.
#[must_use]
pub fn room_name(meeting_id: Uuid) -> String {
    format!("mtg-{}", meeting_id.simple())
}

/// Join a meeting.
///
/// Evaluates the full admission algorithm (status gate, password, role
/// derivation, idempotent roster upsert) against the latest committed state.
/// A host or co-host joining a scheduled meeting auto-starts it in the same
/// atomic step.
///
/// # Errors
///
/// `NotFound`, `MeetingClosed`, `MeetingCancelled`, `InvalidPassword`.
pub async fn join(
    store: &MeetingStore,
    meeting_id: Uuid,
    ctx: &IdentityContext,
    display_name: &str,
    declared_role: Option<MeetingRole>,
    password: Option<&str>,
) -> Result<JoinOutcome, SessionError> {
    // Advisory pre-check: a non-privileged caller against a scheduled
    // meeting waits without touching the record. The authoritative checks
    // re-run inside the mutation below.
    let snapshot = store
        .get(meeting_id)
        .await
        .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;

    if snapshot.status == MeetingStatus::Scheduled && !snapshot.is_host_or_co_host(ctx.user_id) {
        debug!(
            target: "sc.roster",
            meeting_id = %meeting_id,
            identity = %ctx.user_id,
            "Join deferred: waiting for host"
        );
        return Ok(JoinOutcome::WaitingForHost);
    }

    let display_name = display_name.trim().to_string();
    store
        .mutate(meeting_id, |meeting| {
            match meeting.status {
                MeetingStatus::Ended => return Err(SessionError::MeetingClosed),
                MeetingStatus::Cancelled => return Err(SessionError::MeetingCancelled),
                MeetingStatus::Scheduled => {
                    if !meeting.is_host_or_co_host(ctx.user_id) {
                        // Lost a race with another transition attempt; the
                        // caller goes back to waiting.
                        return Ok(JoinOutcome::WaitingForHost);
                    }
                    // First privileged join takes the meeting live.
                    lifecycle::transition(meeting, MeetingAction::Start, ctx)?;
                }
                MeetingStatus::Live => {}
            }

            if let Some(hash) = &meeting.password_hash {
                let supplied = password.ok_or(SessionError::InvalidPassword)?;
                let matches =
                    bcrypt::verify(supplied, hash).map_err(|_| SessionError::Internal)?;
                if !matches {
                    return Err(SessionError::InvalidPassword);
                }
            }

            let role = derive_role(meeting, ctx, declared_role);
            upsert_participant(meeting, ctx.user_id, display_name, role);

            info!(
                target: "sc.roster",
                meeting_id = %meeting_id,
                identity = %ctx.user_id,
                role = role.as_str(),
                roster_size = meeting.participants.len(),
                "Participant joined"
            );

            Ok(JoinOutcome::Admitted {
                role,
                room_name: room_name(meeting_id),
            })
        })
        .await
}

/// Upsert the identity into the roster.
///
/// Re-joining (reconnect) refreshes `display_name`, `role`, and `joined_at`
/// without duplicating the entry.
fn upsert_participant(meeting: &mut Meeting, identity: Uuid, display_name: String, role: MeetingRole) {
    let joined_at = Utc::now();
    if let Some(existing) = meeting
        .participants
        .iter_mut()
        .find(|p| p.identity == identity)
    {
        existing.display_name = display_name;
        existing.role = role;
        existing.joined_at = joined_at;
    } else {
        meeting.participants.push(ParticipantSession {
            identity,
            display_name,
            role,
            joined_at,
        });
    }
}

/// Remove an identity from the roster.
///
/// Idempotent: leaving twice, or without having joined, is a no-op. Meeting
/// status is never changed by a leave.
///
/// # Errors
///
/// `NotFound` for an unknown meeting.
pub async fn leave(
    store: &MeetingStore,
    meeting_id: Uuid,
    identity: Uuid,
) -> Result<(), SessionError> {
    store
        .mutate(meeting_id, |meeting| {
            let before = meeting.participants.len();
            meeting.participants.retain(|p| p.identity != identity);
            if meeting.participants.len() < before {
                info!(
                    target: "sc.roster",
                    meeting_id = %meeting_id,
                    identity = %identity,
                    roster_size = meeting.participants.len(),
                    "Participant left"
                );
            }
            Ok(())
        })
        .await
}

/// End the meeting for all participants.
///
/// Delegates to the state machine `end` action, which clears the roster.
/// Participant disconnection itself is handled by the transport's room
/// teardown once the room's credentials stop being honored; this service
/// does not message participants individually.
///
/// # Errors
///
/// `NotFound`, `MeetingClosed`, `MeetingCancelled`, `PermissionDenied`.
pub async fn end_for_all(
    store: &MeetingStore,
    meeting_id: Uuid,
    ctx: &IdentityContext,
) -> Result<Meeting, SessionError> {
    store
        .mutate(meeting_id, |meeting| {
            lifecycle::transition(meeting, MeetingAction::End, ctx)?;
            Ok(meeting.clone())
        })
        .await
}
