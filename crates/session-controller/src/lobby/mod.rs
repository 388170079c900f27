//! Lobby guard: the pre-join gate.
//!
//! Order of checks before anyone receives a transport grant:
//!
//! 1. Device preflight (camera/microphone acquisition). A failure here is
//!    recoverable, surfaces a re-prompt, and never touches meeting or
//!    roster state.
//! 2. Terminal-state check: `ended`/`cancelled` block entry with a final
//!    message.
//! 3. Non-privileged callers against a `scheduled` meeting get a
//!    "waiting for host" outcome carrying a live subscription to the
//!    meeting, so the wait re-evaluates on every committed change instead
//!    of being a one-shot check.
//! 4. Admission: membership join, then token issuance — two sequential,
//!    independently retryable steps. A token failure leaves the roster
//!    membership in place.

use crate::errors::SessionError;
use crate::models::{Meeting, MeetingRole, MeetingStatus};
use crate::roster::{self, JoinOutcome};
use crate::store::MeetingStore;
use crate::tokens::{TokenIssuer, TransportGrant};
use common::identity::IdentityContext;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

/// Device-level media failure. Recoverable: the caller re-prompts and
/// retries; meeting state is never affected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreflightError {
    /// The user denied the OS permission prompt.
    #[error("Permission to use the {device} was denied")]
    PermissionDenied {
        /// "camera" or "microphone".
        device: &'static str,
    },

    /// No usable device was found.
    #[error("No usable {device} was found")]
    DeviceUnavailable {
        /// "camera" or "microphone".
        device: &'static str,
    },
}

/// External collaborator: the OS media permission prompt.
#[async_trait::async_trait]
pub trait MediaPreflight: Send + Sync {
    /// Confirm audio/video capability can be acquired.
    async fn check(&self) -> Result<(), PreflightError>;
}

/// Lobby failure: either a recoverable device problem or a session-level
/// rejection. Kept separate so callers can offer a retry prompt for the
/// former and a terminal redirect for the latter.
#[derive(Debug, Error)]
pub enum LobbyError {
    /// Recoverable device/permission failure.
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    /// Session-level rejection (not found, closed, wrong password, ...).
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result of a successful pass through the lobby.
#[derive(Debug)]
pub enum LobbyOutcome {
    /// Fully admitted: roster entry exists and a transport grant was issued.
    Admitted {
        /// Role derived for this session.
        role: MeetingRole,
        /// Transport room shared by the meeting.
        room_name: String,
        /// Credential for the external transport.
        grant: TransportGrant,
    },

    /// Meeting has not started; hold in the lobby and watch for changes.
    WaitingForHost {
        /// Snapshot subscription; see [`wait_for_start`].
        updates: watch::Receiver<Meeting>,
    },
}

/// The pre-join gate.
pub struct LobbyGuard<'a> {
    store: &'a MeetingStore,
    issuer: &'a TokenIssuer,
    preflight: &'a dyn MediaPreflight,
}

impl<'a> LobbyGuard<'a> {
    /// Build a guard over the store, token issuer, and device collaborator.
    #[must_use]
    pub fn new(
        store: &'a MeetingStore,
        issuer: &'a TokenIssuer,
        preflight: &'a dyn MediaPreflight,
    ) -> Self {
        Self {
            store,
            issuer,
            preflight,
        }
    }

    /// Run the full pre-join flow.
    ///
    /// # Errors
    ///
    /// `LobbyError::Preflight` for recoverable device failures;
    /// `LobbyError::Session` for everything else, including a
    /// `TokenIssuanceFailed` after a join that already took effect — in that
    /// case the caller retries the token step alone.
    pub async fn prepare_join(
        &self,
        meeting_id: Uuid,
        ctx: &IdentityContext,
        display_name: &str,
        declared_role: Option<MeetingRole>,
        password: Option<&str>,
    ) -> Result<LobbyOutcome, LobbyError> {
        self.preflight.check().await?;

        match roster::join(self.store, meeting_id, ctx, display_name, declared_role, password)
            .await?
        {
            JoinOutcome::Admitted { role, room_name } => {
                let grant = self
                    .issuer
                    .issue(&room_name, display_name, role)
                    .map_err(LobbyError::Session)?;

                info!(
                    target: "sc.lobby",
                    meeting_id = %meeting_id,
                    identity = %ctx.user_id,
                    role = role.as_str(),
                    "Lobby admitted participant"
                );

                Ok(LobbyOutcome::Admitted {
                    role,
                    room_name,
                    grant,
                })
            }
            JoinOutcome::WaitingForHost => {
                debug!(
                    target: "sc.lobby",
                    meeting_id = %meeting_id,
                    identity = %ctx.user_id,
                    "Holding in lobby until host starts"
                );
                let updates = self.store.subscribe(meeting_id)?;
                Ok(LobbyOutcome::WaitingForHost { updates })
            }
        }
    }
}

/// Await the meeting going live on a lobby subscription.
///
/// Returns as soon as a committed snapshot shows `live`. The wait has no
/// in-core timeout; the UI layer bounds it.
///
/// # Errors
///
/// `MeetingClosed` / `MeetingCancelled` if the meeting reaches a terminal
/// state while waiting.
pub async fn wait_for_start(mut updates: watch::Receiver<Meeting>) -> Result<(), SessionError> {
    loop {
        match updates.borrow_and_update().status {
            MeetingStatus::Live => return Ok(()),
            MeetingStatus::Ended => return Err(SessionError::MeetingClosed),
            MeetingStatus::Cancelled => return Err(SessionError::MeetingCancelled),
            MeetingStatus::Scheduled => {}
        }

        if updates.changed().await.is_err() {
            // Publisher gone; treat as the meeting having been torn down.
            return Err(SessionError::MeetingClosed);
        }
    }
}
