//! Common types and utilities shared across techtweet crates.
//!
//! This crate holds the pieces every other crate needs: the shared error type,
//! credential presence checks, and the observability bootstrap. It stays
//! dependency-light so the HTTP, LLM, and social crates can all lean on it.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TechtweetError`] and [`Result`]: shared error handling
//! - [`require_credential`]: reject blank secrets before they hit the network
//!
//! # Examples
//!
//! ```rust
//! use techtweet_common::{require_credential, TechtweetError};
//!
//! assert_eq!(require_credential("app_key", "  abc ").unwrap(), "abc");
//! assert!(matches!(
//!     require_credential("app_key", ""),
//!     Err(TechtweetError::MissingCredential(name)) if name == "app_key"
//! ));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Error types used across the techtweet workspace.
#[derive(thiserror::Error, Debug)]
pub enum TechtweetError {
    /// A required secret resolved to an empty value.
    #[error("missing credential: {0}")]
    MissingCredential(String),
}

/// Convenient alias for results that use [`TechtweetError`].
pub type Result<T> = std::result::Result<T, TechtweetError>;

/// Return the trimmed secret, or [`TechtweetError::MissingCredential`] when it is blank.
///
/// Configuration blanks unresolved `${VAR}` placeholders, so an unset
/// environment variable shows up here as an empty string.
pub fn require_credential<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TechtweetError::MissingCredential(name.to_string()));
    }
    Ok(trimmed)
}

/// How a run was triggered. Carried into log spans so scheduled and
/// request-driven runs can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Scheduled,
    Request,
    Manual,
}

impl std::fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriggerMode::Scheduled => "scheduled",
            TriggerMode::Request => "request",
            TriggerMode::Manual => "manual",
        };
        f.write_str(s)
    }
}
