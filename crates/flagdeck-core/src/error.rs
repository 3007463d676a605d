//! Error types for flagdeck-core

use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::coordinator::ToggleRejected;
use crate::notify::ToastKind;
use crate::util::compact_text;

/// Result type alias using flagdeck-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flagdeck-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Toggle refused locally
    #[error(transparent)]
    Toggle(#[from] ToggleRejected),

    /// Flag not present in the local store
    #[error("Flag not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classification of a failed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server could not be reached (no HTTP status).
    Network,
    /// 401
    Authentication,
    /// 403
    Authorization,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 429
    RateLimited,
    /// 400 and 422
    Validation,
    /// 5xx
    Server,
    Unclassified,
}

impl ApiErrorKind {
    /// Classify an HTTP status code. `0` means the request never got a response.
    pub const fn from_status(status: u16) -> Self {
        match status {
            0 => Self::Network,
            400 | 422 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ => Self::Unclassified,
        }
    }

    /// Toast raised globally for this kind of failure, if any.
    ///
    /// Not-found is left to the caller and unclassified codes stay quiet.
    pub const fn global_notice(self) -> Option<(ToastKind, &'static str)> {
        match self {
            Self::Network => Some((ToastKind::Error, "Connection Error")),
            Self::Authentication => Some((ToastKind::Warning, "Authentication Required")),
            Self::Authorization => Some((ToastKind::Error, "Access Denied")),
            Self::RateLimited => Some((ToastKind::Warning, "Rate Limited")),
            Self::Server => Some((ToastKind::Error, "Server Error")),
            Self::NotFound | Self::Conflict | Self::Validation | Self::Unclassified => None,
        }
    }
}

/// A failed call against the flag API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, `0` for connectivity failures.
    pub status: u16,
    pub method: String,
    pub url: String,
    /// User-facing message.
    pub message: String,
}

impl ApiError {
    /// Build an error from a non-success response body.
    ///
    /// A JSON `message` field sent by the server wins over the fixed text.
    pub fn from_response(method: &str, url: &str, status: StatusCode, body: &str) -> Self {
        let status = status.as_u16();
        let message =
            server_message(body).unwrap_or_else(|| status_message(status).to_string());
        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            method: method.to_string(),
            url: url.to_string(),
            message,
        }
    }

    /// Build an error from a transport failure.
    pub fn from_transport(method: &str, url: &str, error: &reqwest::Error) -> Self {
        let status = error.status().map_or(0, |status| status.as_u16());
        let message = if status == 0 {
            status_message(0).to_string()
        } else {
            format!("{} ({error})", status_message(status))
        };
        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            method: method.to_string(),
            url: url.to_string(),
            message,
        }
    }

    /// Message shown in a global notification for this error.
    pub fn notice_message(&self) -> &str {
        if self.kind == ApiErrorKind::RateLimited {
            "Please wait before trying again."
        } else {
            &self.message
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == 0 {
            write!(formatter, "{}", self.message)
        } else {
            write!(formatter, "{} (HTTP {})", self.message, self.status)
        }
    }
}

impl std::error::Error for ApiError {}

/// Fixed user-facing text for a status code.
pub const fn status_message(status: u16) -> &'static str {
    match status {
        0 => "Unable to connect to the server. Please check your network connection.",
        400 => "Invalid request. Please check your input.",
        401 => "Please log in to continue.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "A conflict occurred. The resource may have been modified.",
        422 => "The request could not be processed. Please check your input.",
        429 => "Too many requests. Please try again later.",
        500 => "An internal server error occurred. Please try again later.",
        502 => "The server is temporarily unavailable. Please try again later.",
        503 => "The service is currently unavailable. Please try again later.",
        504 => "The server took too long to respond. Please try again.",
        _ => "An unexpected error occurred.",
    }
}

/// Store-level message for a failed load, as shown in the dashboard banner.
pub fn load_error_message(error: &Error) -> String {
    match error {
        Error::Api(api) => match api.kind {
            ApiErrorKind::Network => status_message(0).to_string(),
            ApiErrorKind::Authentication => "Authentication required. Please log in.".to_string(),
            ApiErrorKind::Authorization => status_message(403).to_string(),
            ApiErrorKind::NotFound => status_message(404).to_string(),
            ApiErrorKind::Server => "Server error. Please try again later.".to_string(),
            _ => api.message.clone(),
        },
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    let payload = serde_json::from_str::<ErrorBody>(body).ok()?;
    payload
        .message
        .map(|message| compact_text(&message))
        .filter(|message| !message.is_empty())
}
