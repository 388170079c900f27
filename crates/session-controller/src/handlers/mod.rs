//! HTTP request handlers for the Session Controller.

pub mod health;
pub mod meetings;
pub mod recordings;
pub mod tokens;

pub use health::health_check;
