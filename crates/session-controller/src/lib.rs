//! Session Controller (SC) Service Library
//!
//! Coordinates scheduled meetings for the foundation back office:
//!
//! - Meeting lifecycle (schedule, start, end, cancel)
//! - Roster membership and role derivation
//! - Lobby admission with media preflight
//! - Transport grant issuance for the media layer
//! - Recording access control and 7-day share links
//!
//! # Architecture
//!
//! Handlers translate HTTP to domain calls; all meeting mutations funnel
//! through [`store::MeetingStore::mutate`], which linearizes writes per
//! meeting and publishes a snapshot to watchers on every commit:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> lifecycle | roster | recording -> store
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `lifecycle` - Meeting status state machine
//! - `lobby` - Pre-join gate (media preflight + admission + grant)
//! - `middleware` - Gateway identity extraction
//! - `models` - Data models
//! - `recording` - Recording access authorization
//! - `roster` - Join/leave and role derivation
//! - `routes` - Axum router setup
//! - `store` - In-memory meeting store with per-meeting linearization
//! - `tokens` - Transport grants and recording share tokens

pub mod config;
pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod lobby;
pub mod middleware;
pub mod models;
pub mod recording;
pub mod roster;
pub mod routes;
pub mod store;
pub mod tokens;
