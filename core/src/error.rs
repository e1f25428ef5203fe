//! Error types for the micro-finance client.
//!
//! # Design
//! Every failed call surfaces as one `ApiError`, whichever stage failed. The
//! variants keep the stage apart for logging and for callers that want it,
//! but nothing in this crate recovers from any of them.

use thiserror::Error;

/// Errors returned by `LoanClient` and `LoanService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response: connection refused, timeout,
    /// or the body could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Status code of an `HttpError`, `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while reading `AppConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised when assembling a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route path must start with '/': {0}")]
    InvalidPath(String),

    #[error("duplicate route path: {0}")]
    DuplicatePath(String),

    #[error("duplicate route name: {0}")]
    DuplicateName(String),
}
