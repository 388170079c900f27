//! Transport grant handler.
//!
//! Credential issuance is decoupled from roster admission: a client that was
//! admitted keeps its roster seat even when this endpoint fails, and simply
//! retries here. The two steps share no transaction.

use crate::errors::SessionError;
use crate::routes::AppState;
use crate::tokens::TransportGrant;
use axum::{extract::State, Extension, Json};
use common::identity::IdentityContext;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::TokenRequest;

/// Handler for `POST /v1/tokens`.
///
/// Issues a signed transport grant scoped to a single room, with
/// capabilities derived from the requested role.
#[instrument(skip(state, ctx, request), fields(identity = %ctx.user_id, room = %request.room_name))]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TransportGrant>, SessionError> {
    let grant = state
        .token_issuer
        .issue(&request.room_name, &request.display_name, request.role)?;

    info!(
        target: "sc.tokens",
        identity = %ctx.user_id,
        room = %request.room_name,
        role = request.role.as_str(),
        "Transport grant issued"
    );

    Ok(Json(grant))
}
