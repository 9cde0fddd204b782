//! Error handling for urlquery API operations.
//!
//! This module defines a single error type that covers every way a call can
//! fail: client-side validation, transport problems, HTTP status errors
//! returned by the API, and malformed response bodies.

use std::fmt;
use std::time::Duration;

/// Classification of a non-success HTTP status returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other 5xx status
    ServerError,
    /// Anything outside the known success and error codes
    UnexpectedStatus,
}

impl ApiErrorKind {
    /// Canonical human-readable message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::NotAcceptable => "not acceptable",
            Self::UnprocessableEntity => "unprocessable entity",
            Self::TooManyRequests => "too many requests",
            Self::InternalServerError => "internal server error",
            Self::BadGateway => "bad gateway",
            Self::ServiceUnavailable => "service unavailable",
            Self::GatewayTimeout => "gateway timeout",
            Self::ServerError => "server error",
            Self::UnexpectedStatus => "unexpected status code",
        }
    }
}

/// Main error type for urlquery operations.
#[derive(Debug, Clone)]
pub enum UrlqueryError {
    /// Report ID does not have the UUIDv4 shape
    InvalidReportId { id: String },

    /// A required argument is missing or malformed
    InvalidArgument { field: String, reason: String },

    /// The request could not be constructed (bad base URL, bad header, ...)
    Request { message: String },

    /// Transport failures: DNS, connection refused, TLS, broken pipe
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// The request or an operation exceeded its time budget
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The API answered with a non-success status
    Api {
        kind: ApiErrorKind,
        status_code: u16,
        message: String,
    },

    /// The response body could not be inflated or parsed
    Decode { message: String },

    /// Configuration errors (unknown key, invalid value, unreadable file)
    ConfigError { message: String },

    /// File I/O errors when writing downloaded artifacts
    FileError { path: String, message: String },

    /// A long-running operation was cancelled by the caller
    Cancelled { operation: String },

    /// The poll loop gave up before the job finished
    PollLimitReached { queue_id: String, attempts: u32 },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl UrlqueryError {
    /// Create a new invalid report ID error.
    pub fn invalid_report_id<I: Into<String>>(id: I) -> Self {
        Self::InvalidReportId { id: id.into() }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new request construction error.
    pub fn request<M: Into<String>>(message: M) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an API error for the given kind and status code.
    pub fn api(kind: ApiErrorKind, status_code: u16) -> Self {
        Self::Api {
            kind,
            status_code,
            message: kind.message().to_string(),
        }
    }

    /// Create a new decode error.
    pub fn decode<M: Into<String>>(message: M) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new cancellation error.
    pub fn cancelled<O: Into<String>>(operation: O) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code carried by API errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True for client-side validation failures raised before any request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidReportId { .. } | Self::InvalidArgument { .. }
        )
    }

    /// Check if this error suggests the operation could be retried by the caller.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::Api {
                    kind: ApiErrorKind::TooManyRequests,
                    ..
                }
                | Self::Api {
                    status_code: 500..=599,
                    ..
                }
        )
    }
}

impl fmt::Display for UrlqueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReportId { id } => {
                write!(f, "Invalid Report ID '{}': expected a UUID", id)
            }
            Self::InvalidArgument { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::Request { message } => {
                write!(f, "Failed to build request: {}", message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Api {
                status_code,
                message,
                ..
            } => {
                write!(f, "API Error (HTTP StatusCode: {}) {}", status_code, message)
            }
            Self::Decode { message } => {
                write!(f, "Decode error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Cancelled { operation } => {
                write!(f, "Cancelled: {}", operation)
            }
            Self::PollLimitReached { queue_id, attempts } => {
                write!(
                    f,
                    "Gave up waiting for queue '{}' after {} status checks",
                    queue_id, attempts
                )
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for UrlqueryError {}

impl From<reqwest::Error> for UrlqueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_builder() {
            Self::request(err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for UrlqueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("JSON parsing failed: {}", err))
    }
}

impl From<serde_yaml::Error> for UrlqueryError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("YAML parsing failed: {}", err))
    }
}
