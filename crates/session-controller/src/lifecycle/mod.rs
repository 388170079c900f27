//! Meeting lifecycle state machine.
//!
//! [`transition`] is a pure guard over the meeting record: it is always run
//! inside [`MeetingStore::mutate`](crate::store::MeetingStore::mutate), so a
//! successful transition is committed and visible to all readers before any
//! subsequent join or leave is evaluated.
//!
//! Legal paths are `scheduled -> live -> ended` and
//! `scheduled -> cancelled`. `ended` and `cancelled` are terminal.

use crate::errors::SessionError;
use crate::models::{Meeting, MeetingStatus};
use common::identity::IdentityContext;
use tracing::info;

/// Action driving a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingAction {
    /// Take a scheduled meeting live.
    Start,

    /// End a live meeting (or cancel one that never went live).
    End,

    /// Cancel a scheduled meeting.
    Cancel,
}

/// Result of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Meeting moved from `scheduled` to `live`.
    Started,

    /// Meeting was already `live`; `start` is idempotent so two clients
    /// racing to start both succeed.
    AlreadyLive,

    /// Meeting moved to `ended`; roster has been cleared.
    Ended,

    /// Meeting moved to `cancelled`.
    Cancelled,
}

/// Apply a lifecycle action to the meeting, enforcing guards.
///
/// # Errors
///
/// - `MeetingClosed` / `MeetingCancelled` for any action against a terminal
///   state
/// - `PermissionDenied` when the actor lacks the required meeting role
/// - `Conflict` for an action that is illegal in the current state
pub fn transition(
    meeting: &mut Meeting,
    action: MeetingAction,
    actor: &IdentityContext,
) -> Result<TransitionOutcome, SessionError> {
    match meeting.status {
        MeetingStatus::Ended => return Err(SessionError::MeetingClosed),
        MeetingStatus::Cancelled => return Err(SessionError::MeetingCancelled),
        MeetingStatus::Scheduled | MeetingStatus::Live => {}
    }

    match action {
        MeetingAction::Start => start(meeting, actor),
        MeetingAction::End => match meeting.status {
            // Ending a meeting that never went live is a cancellation.
            MeetingStatus::Scheduled => cancel(meeting, actor),
            _ => end(meeting, actor),
        },
        MeetingAction::Cancel => match meeting.status {
            MeetingStatus::Scheduled => cancel(meeting, actor),
            _ => Err(SessionError::Conflict(
                "A live meeting cannot be cancelled; end it instead".to_string(),
            )),
        },
    }
}

fn start(meeting: &mut Meeting, actor: &IdentityContext) -> Result<TransitionOutcome, SessionError> {
    if meeting.status == MeetingStatus::Live {
        return Ok(TransitionOutcome::AlreadyLive);
    }

    if !meeting.is_host_or_co_host(actor.user_id) {
        return Err(SessionError::PermissionDenied(
            "Only the host or a co-host can start the meeting".to_string(),
        ));
    }

    meeting.status = MeetingStatus::Live;
    info!(
        target: "sc.lifecycle",
        meeting_id = %meeting.meeting_id,
        actor = %actor.user_id,
        "Meeting started"
    );
    Ok(TransitionOutcome::Started)
}

fn end(meeting: &mut Meeting, actor: &IdentityContext) -> Result<TransitionOutcome, SessionError> {
    if !meeting.is_host_or_co_host(actor.user_id) {
        return Err(SessionError::PermissionDenied(
            "Only the host or a co-host can end the meeting".to_string(),
        ));
    }

    meeting.status = MeetingStatus::Ended;
    meeting.participants.clear();
    info!(
        target: "sc.lifecycle",
        meeting_id = %meeting.meeting_id,
        actor = %actor.user_id,
        "Meeting ended"
    );
    Ok(TransitionOutcome::Ended)
}

fn cancel(meeting: &mut Meeting, actor: &IdentityContext) -> Result<TransitionOutcome, SessionError> {
    if meeting.host_id != actor.user_id {
        return Err(SessionError::PermissionDenied(
            "Only the host can cancel the meeting".to_string(),
        ));
    }

    meeting.status = MeetingStatus::Cancelled;
    info!(
        target: "sc.lifecycle",
        meeting_id = %meeting.meeting_id,
        actor = %actor.user_id,
        "Meeting cancelled"
    );
    Ok(TransitionOutcome::Cancelled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{test_meeting, MeetingRole, ParticipantSession};
    use chrono::Utc;
    use uuid::Uuid;

    fn actor(user_id: Uuid) -> IdentityContext {
        IdentityContext::member(user_id, Uuid::new_v4())
    }

    #[test]
    fn test_host_starts_scheduled_meeting() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());

        let outcome = transition(&mut meeting, MeetingAction::Start, &actor(host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::Started);
        assert_eq!(meeting.status, MeetingStatus::Live);
    }

    #[test]
    fn test_co_host_starts_scheduled_meeting() {
        let co_host = Uuid::new_v4();
        let mut meeting = test_meeting(Uuid::new_v4(), Uuid::new_v4());
        meeting.co_hosts.insert(co_host);

        let outcome = transition(&mut meeting, MeetingAction::Start, &actor(co_host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::Started);
    }

    #[test]
    fn test_non_host_cannot_start() {
        let mut meeting = test_meeting(Uuid::new_v4(), Uuid::new_v4());

        let result = transition(&mut meeting, MeetingAction::Start, &actor(Uuid::new_v4()));
        assert!(matches!(result, Err(SessionError::PermissionDenied(_))));
        assert_eq!(meeting.status, MeetingStatus::Scheduled);
    }

    #[test]
    fn test_start_is_idempotent_when_live() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());
        meeting.status = MeetingStatus::Live;

        // Two clients racing to start: the second gets the current state
        // back, not an error.
        let outcome = transition(&mut meeting, MeetingAction::Start, &actor(host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::AlreadyLive);
        assert_eq!(meeting.status, MeetingStatus::Live);
    }

    #[test]
    fn test_start_idempotency_does_not_require_host() {
        let mut meeting = test_meeting(Uuid::new_v4(), Uuid::new_v4());
        meeting.status = MeetingStatus::Live;

        let outcome =
            transition(&mut meeting, MeetingAction::Start, &actor(Uuid::new_v4())).unwrap();
        assert_eq!(outcome, TransitionOutcome::AlreadyLive);
    }

    #[test]
    fn test_end_clears_roster() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());
        meeting.status = MeetingStatus::Live;
        meeting.participants.push(ParticipantSession {
            identity: Uuid::new_v4(),
            display_name: "Dana".to_string(),
            role: MeetingRole::Participant,
            joined_at: Utc::now(),
        });

        let outcome = transition(&mut meeting, MeetingAction::End, &actor(host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::Ended);
        assert_eq!(meeting.status, MeetingStatus::Ended);
        assert!(meeting.participants.is_empty());
    }

    #[test]
    fn test_non_host_cannot_end() {
        let mut meeting = test_meeting(Uuid::new_v4(), Uuid::new_v4());
        meeting.status = MeetingStatus::Live;

        let result = transition(&mut meeting, MeetingAction::End, &actor(Uuid::new_v4()));
        assert!(matches!(result, Err(SessionError::PermissionDenied(_))));
    }

    #[test]
    fn test_end_of_scheduled_meeting_cancels_it() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());

        let outcome = transition(&mut meeting, MeetingAction::End, &actor(host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::Cancelled);
        assert_eq!(meeting.status, MeetingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_requires_host_not_co_host() {
        let co_host = Uuid::new_v4();
        let mut meeting = test_meeting(Uuid::new_v4(), Uuid::new_v4());
        meeting.co_hosts.insert(co_host);

        let result = transition(&mut meeting, MeetingAction::Cancel, &actor(co_host));
        assert!(matches!(result, Err(SessionError::PermissionDenied(_))));
    }

    #[test]
    fn test_cancel_scheduled_meeting() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());

        let outcome = transition(&mut meeting, MeetingAction::Cancel, &actor(host)).unwrap();
        assert_eq!(outcome, TransitionOutcome::Cancelled);
    }

    #[test]
    fn test_cancel_live_meeting_is_rejected() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());
        meeting.status = MeetingStatus::Live;

        let result = transition(&mut meeting, MeetingAction::Cancel, &actor(host));
        assert!(matches!(result, Err(SessionError::Conflict(_))));
        assert_eq!(meeting.status, MeetingStatus::Live);
    }

    #[test]
    fn test_no_transition_out_of_ended() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());
        meeting.status = MeetingStatus::Ended;

        for action in [MeetingAction::Start, MeetingAction::End, MeetingAction::Cancel] {
            let result = transition(&mut meeting, action, &actor(host));
            assert!(matches!(result, Err(SessionError::MeetingClosed)));
            assert_eq!(meeting.status, MeetingStatus::Ended);
        }
    }

    #[test]
    fn test_no_transition_out_of_cancelled() {
        let host = Uuid::new_v4();
        let mut meeting = test_meeting(host, Uuid::new_v4());
        meeting.status = MeetingStatus::Cancelled;

        for action in [MeetingAction::Start, MeetingAction::End, MeetingAction::Cancel] {
            let result = transition(&mut meeting, action, &actor(host));
            assert!(matches!(result, Err(SessionError::MeetingCancelled)));
            assert_eq!(meeting.status, MeetingStatus::Cancelled);
        }
    }
}
