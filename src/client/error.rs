//! Error type shared by every layer of the Mealie client.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by [`MealieClient`](crate::client::MealieClient).
///
/// Non-2xx responses are *not* errors at this level: the client hands them
/// back as [`MealieResponse`](crate::client::MealieResponse) values and the
/// caller decides. [`MealieError::Upstream`] only appears when a caller opts
/// in through [`MealieResponse::error_for_status`](crate::client::MealieResponse::error_for_status).
#[derive(Error, Debug)]
pub enum MealieError {
    /// Missing or malformed settings, detected before any network traffic.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The password grant against `/api/auth/token` did not produce a token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network-level failure (connect, DNS, timeout, body read).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON the caller asked for.
    #[error("Invalid JSON in Mealie response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Mealie answered with a status the caller treats as failure.
    #[error("Mealie API error: {status} - {body}")]
    Upstream { status: StatusCode, body: String },

    /// The client was used after `close()`.
    #[error("Mealie client is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, MealieError>;
