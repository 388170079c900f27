//! Common types shared across the session coordination service.

#![warn(clippy::pedantic)]

/// Module for the caller identity and tenant context
pub mod identity;

/// Module for secret types that prevent accidental logging
pub mod secret;
