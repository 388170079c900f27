//! Caller identity and tenant context.
//!
//! Every core operation receives an [`IdentityContext`] as an explicit
//! parameter rather than reading ambient request state. The context is
//! produced by the authenticating gateway, which the service trusts as
//! already authenticated; the core only interprets it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Foundation-level administrative tier of a caller.
///
/// Independent of any meeting-local host/co-host status. Ordering is
/// significant: `Member < Staff < Admin < SuperAdmin`, so tier checks can be
/// written as comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeTier {
    /// Regular foundation member (applicants, beneficiaries).
    Member,

    /// Review staff; elevated within their own foundation.
    Staff,

    /// Foundation administrator.
    Admin,

    /// Cross-tenant platform administrator.
    SuperAdmin,
}

impl PrivilegeTier {
    /// Returns the string representation of the tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivilegeTier::Member => "member",
            PrivilegeTier::Staff => "staff",
            PrivilegeTier::Admin => "admin",
            PrivilegeTier::SuperAdmin => "super_admin",
        }
    }
}

/// Error returned when parsing a [`PrivilegeTier`] from a string fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown privilege tier: {0}")]
pub struct ParseTierError(pub String);

impl FromStr for PrivilegeTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(PrivilegeTier::Member),
            "staff" => Ok(PrivilegeTier::Staff),
            "admin" => Ok(PrivilegeTier::Admin),
            "super_admin" => Ok(PrivilegeTier::SuperAdmin),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller context supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Authenticated user identifier.
    pub user_id: Uuid,

    /// Tenant (foundation) the caller belongs to.
    pub foundation_id: Uuid,

    /// Foundation-level administrative tier.
    pub privilege_tier: PrivilegeTier,
}

impl IdentityContext {
    /// Build a context for a regular member. Convenience for tests and
    /// internal callers.
    #[must_use]
    pub fn member(user_id: Uuid, foundation_id: Uuid) -> Self {
        Self {
            user_id,
            foundation_id,
            privilege_tier: PrivilegeTier::Member,
        }
    }

    /// Whether the caller holds the cross-tenant administrative tier.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.privilege_tier == PrivilegeTier::SuperAdmin
    }
}
