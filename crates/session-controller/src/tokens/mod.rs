//! Credential issuance.
//!
//! Two independent credential families live here:
//!
//! - **Transport grants**: short-lived, role-scoped HS256 tokens the external
//!   real-time transport accepts for a room. Pure mapping from
//!   `(room_name, role)` to a signed grant; no persisted state, read-only
//!   with respect to the meeting record.
//! - **Share tokens**: 7-day credentials granting recording-view access to
//!   viewers outside the meeting's tenant, bound to one meeting.
//!
//! Issuance failures surface as `TokenIssuanceFailed` and are retryable on
//! their own; a join that already succeeded at the roster level stays valid.

use crate::errors::SessionError;
use crate::models::MeetingRole;
use chrono::{DateTime, Duration, Utc};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Share tokens are valid for 7 days from issuance.
pub const SHARE_TOKEN_VALIDITY: Duration = Duration::days(7);

/// Capabilities encoded into a transport grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May publish microphone audio.
    pub publish_audio: bool,

    /// May publish camera video.
    pub publish_video: bool,

    /// May share their screen.
    pub screen_share: bool,

    /// Room administration: mute others, remove participants, end the room.
    pub room_admin: bool,
}

impl Capabilities {
    /// Capability set for a meeting role.
    #[must_use]
    pub fn for_role(role: MeetingRole) -> Self {
        match role {
            MeetingRole::Host | MeetingRole::CoHost => Self {
                publish_audio: true,
                publish_video: true,
                screen_share: true,
                room_admin: true,
            },
            MeetingRole::Moderator | MeetingRole::Participant => Self {
                publish_audio: true,
                publish_video: true,
                screen_share: false,
                room_admin: false,
            },
        }
    }
}

/// Claims carried by a transport grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportClaims {
    /// Issuer: the transport API key.
    pub iss: String,

    /// Subject: participant display name shown in the room.
    pub sub: String,

    /// Transport room the grant is scoped to.
    pub room: String,

    /// Capability grant derived from the meeting role.
    pub capabilities: Capabilities,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

/// A signed grant plus the endpoint it is valid against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportGrant {
    /// Signed transport token.
    pub token: String,

    /// Transport endpoint URL the client connects to.
    pub transport_url: String,

    /// Grant validity in seconds from now.
    pub expires_in: u64,
}

/// Stateless issuer of transport grants.
pub struct TokenIssuer {
    transport_url: String,
    api_key: String,
    api_secret: SecretString,
    ttl_seconds: u64,
}

impl TokenIssuer {
    /// Create an issuer for the given transport endpoint and signing key.
    #[must_use]
    pub fn new(
        transport_url: String,
        api_key: String,
        api_secret: SecretString,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            transport_url,
            api_key,
            api_secret,
            ttl_seconds,
        }
    }

    /// Issue a grant for `(room_name, role)`.
    ///
    /// # Errors
    ///
    /// `TokenIssuanceFailed` if signing fails. The caller may retry without
    /// repeating the join.
    pub fn issue(
        &self,
        room_name: &str,
        display_name: &str,
        role: MeetingRole,
    ) -> Result<TransportGrant, SessionError> {
        let now = Utc::now().timestamp();
        let claims = TransportClaims {
            iss: self.api_key.clone(),
            sub: display_name.to_string(),
            room: room_name.to_string(),
            capabilities: Capabilities::for_role(role),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };

        let key = EncodingKey::from_secret(self.api_secret.expose_secret().as_bytes());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| SessionError::TokenIssuanceFailed(e.to_string()))?;

        debug!(
            target: "sc.tokens",
            room = room_name,
            role = role.as_str(),
            ttl_seconds = self.ttl_seconds,
            "Transport grant issued"
        );

        Ok(TransportGrant {
            token,
            transport_url: self.transport_url.clone(),
            expires_in: self.ttl_seconds,
        })
    }
}

// ============================================================================
// Share Tokens
// ============================================================================

/// Claims carried by a recording share token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareClaims {
    /// Subject: `share:<meeting_id>`.
    pub sub: String,

    /// Meeting the token grants recording access to.
    pub meeting_id: Uuid,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds): issuance + 7 days.
    pub exp: i64,
}

/// Issues and verifies recording share tokens.
pub struct ShareTokens {
    secret: SecretString,
}

impl ShareTokens {
    /// Create a share-token authority from its signing secret.
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Issue a share token for a meeting, valid for 7 days.
    ///
    /// # Errors
    ///
    /// `TokenIssuanceFailed` if signing fails.
    pub fn issue(&self, meeting_id: Uuid) -> Result<String, SessionError> {
        self.issue_at(meeting_id, Utc::now())
    }

    fn issue_at(
        &self,
        meeting_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let claims = ShareClaims {
            sub: format!("share:{meeting_id}"),
            meeting_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + SHARE_TOKEN_VALIDITY).timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| SessionError::TokenIssuanceFailed(e.to_string()))
    }

    /// Check that a token is well-formed, unexpired, and bound to this
    /// meeting. Returns `false` for any failure; share tokens never grant
    /// access to a different meeting than they were minted for.
    #[must_use]
    pub fn verify(&self, token: &str, meeting_id: Uuid) -> bool {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<ShareClaims>(token, &key, &validation) {
            Ok(data) => data.claims.meeting_id == meeting_id,
            Err(e) => {
                debug!(target: "sc.tokens", error = %e, "Share token rejected");
                false
            }
        }
    }
}
