//! Error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! `Unauthorized` is kept separate from every other failure because it is the
//! one outcome that forces the session back to anonymous. Everything else is
//! surfaced to the caller as-is; the session layer decides what to do.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use super::transport::TransportError;

/// Message attached to [`ApiError::Unauthorized`].
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expirée. Veuillez vous reconnecter.";

/// Errors produced by [`crate::net::api::ApiClient`] and the session flows built on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered 401. The stored credential has already been cleared.
    #[error("{msg}", msg = SESSION_EXPIRED_MESSAGE)]
    Unauthorized,

    /// Any other non-2xx status, with the best-effort message from the body.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Network(String),

    /// A login or registration flow got no usable access token back.
    #[error("{0}")]
    InvalidCredentialResponse(&'static str),

    /// A body could not be encoded, or a response did not have the expected shape.
    #[error("invalid JSON payload: {0}")]
    Json(String),
}

impl ApiError {
    /// HTTP status associated with the error, when there was a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Network(_) | Self::InvalidCredentialResponse(_) | Self::Json(_) => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// The message to show a user, or `None` when the error carries nothing readable.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        let message = self.to_string();
        if message.trim().is_empty() { None } else { Some(message) }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.0)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
