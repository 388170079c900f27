//! Identity propagation middleware.
//!
//! The identity provider is an external collaborator: requests arrive
//! through an authenticating gateway that has already verified the caller
//! and stamps the identity headers. This middleware turns those headers into
//! an [`IdentityContext`] in request extensions, so every handler receives
//! the caller's identity and tenant explicitly rather than reading ambient
//! state.
//!
//! # Headers
//!
//! - `x-user-id`: caller UUID
//! - `x-foundation-id`: tenant UUID
//! - `x-privilege-tier`: `member | staff | admin | super_admin`

use crate::errors::SessionError;
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::IntoResponse};
use common::identity::{IdentityContext, PrivilegeTier};
use tracing::debug;
use uuid::Uuid;

/// Middleware that requires the gateway identity headers.
///
/// Rejects with 401 when headers are missing or malformed; otherwise stores
/// the [`IdentityContext`] in request extensions for handlers.
///
/// # Errors
///
/// `Unauthenticated` for missing or malformed identity headers.
pub async fn require_identity(
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, SessionError> {
    let ctx = context_from_headers(req.headers())?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn context_from_headers(headers: &HeaderMap) -> Result<IdentityContext, SessionError> {
    let user_id = uuid_header(headers, "x-user-id")?;
    let foundation_id = uuid_header(headers, "x-foundation-id")?;

    let tier_str = headers
        .get("x-privilege-tier")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            debug!(target: "sc.middleware", "Missing x-privilege-tier header");
            SessionError::Unauthenticated("Missing identity headers".to_string())
        })?;

    let privilege_tier: PrivilegeTier = tier_str.parse().map_err(|_| {
        debug!(target: "sc.middleware", tier = tier_str, "Unknown privilege tier");
        SessionError::Unauthenticated("Invalid identity headers".to_string())
    })?;

    Ok(IdentityContext {
        user_id,
        foundation_id,
        privilege_tier,
    })
}

fn uuid_header(headers: &HeaderMap, name: &'static str) -> Result<Uuid, SessionError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            debug!(target: "sc.middleware", header = name, "Missing identity header");
            SessionError::Unauthenticated("Missing identity headers".to_string())
        })?;

    Uuid::parse_str(value).map_err(|_| {
        debug!(target: "sc.middleware", header = name, "Malformed identity header");
        SessionError::Unauthenticated("Invalid identity headers".to_string())
    })
}
