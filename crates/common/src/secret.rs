//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports from the [`secrecy`] crate. Use these for meeting passwords,
//! signing secrets, and API keys: `Debug` output is redacted, so any struct
//! that derives `Debug` while holding a `SecretString` cannot leak the value
//! through `{:?}` or tracing fields, and the value is zeroized on drop.
//!
//! Access to the wrapped value always goes through an explicit
//! `expose_secret()` call, which keeps every use greppable.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
