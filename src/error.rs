// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent, human-readable messages.
//!
//! Every failure a caller can see falls into one of three groups:
//! transport failures, non-success responses from the API, and validation
//! failures caught before any request is sent. None of them are fatal; the
//! caller shows [`ClientError::user_message`] inline and lets the user retry.

use serde::Deserialize;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Authentication required: {}", message.as_deref().unwrap_or("no details"))]
    Unauthorized { message: Option<String> },

    #[error("Access denied: {}", message.as_deref().unwrap_or("forbidden"))]
    Forbidden { message: Option<String> },

    #[error("Resource not found: {}", message.as_deref().unwrap_or(resource))]
    NotFound {
        resource: String,
        message: Option<String>,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Another request is already in progress")]
    Busy,

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error body returned by the API (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract a readable message from `detail`.
    ///
    /// The API usually sends a plain string, but request validation failures
    /// come back as a list of objects with a `msg` field.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }
}

impl ClientError {
    /// Generic message shown when nothing more specific is available.
    pub const GENERIC_MESSAGE: &'static str = "Something went wrong. Please try again.";

    /// Message shown when the API cannot be reached.
    pub const NETWORK_MESSAGE: &'static str =
        "Could not reach the server. Check your connection and try again.";

    /// Message for a rejected token when the server gave no detail.
    pub const EXPIRED_MESSAGE: &'static str = "Your session has expired. Please log in again.";

    /// A rejected or missing token with no server detail.
    pub fn unauthorized() -> Self {
        ClientError::Unauthorized { message: None }
    }

    /// Human-readable message for inline display.
    pub fn user_message(&self) -> String {
        self.message_or(Self::GENERIC_MESSAGE)
    }

    /// Human-readable message, using `fallback` when the server gave none.
    ///
    /// The server's `detail` always wins. Validation errors carry their own
    /// text.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Api {
                message: Some(msg), ..
            }
            | ClientError::Unauthorized { message: Some(msg) }
            | ClientError::Forbidden { message: Some(msg) }
            | ClientError::NotFound {
                message: Some(msg), ..
            } => msg.clone(),
            ClientError::Transport(_) => Self::NETWORK_MESSAGE.to_string(),
            ClientError::Unauthorized { message: None } => Self::EXPIRED_MESSAGE.to_string(),
            ClientError::Busy => "Please wait for the current request to finish.".into(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the error means the bearer token is no longer accepted.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Whether the API answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Whether the error happened before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Build an error from a non-success status and its (possibly empty) body.
    pub(crate) fn from_status(status: u16, body: &str, resource: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message());

        match status {
            401 => ClientError::Unauthorized { message },
            403 => ClientError::Forbidden { message },
            404 => ClientError::NotFound {
                resource: resource.to_string(),
                message,
            },
            _ => ClientError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        messages.sort();
        ClientError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
