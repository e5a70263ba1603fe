//! Error types for the LittleSis API client.
//!
//! # Design
//! Each variant corresponds to one failure category a caller may want to
//! branch on. HTTP status codes are mapped in `client::check_status`; the
//! hydration engine raises `MalformedResponse` when a payload does not have
//! the shape it was asked to hydrate. Every variant carries the context
//! (URL, body, or reason) needed to diagnose the failure without repeating
//! the request.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key is configured, or the service rejected it (401).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The requested resource or URL does not exist (404 / 405).
    #[error("{reason}: {url}")]
    InvalidRequest { url: String, reason: String },

    /// The service rejected the request parameters (400).
    #[error("invalid request data: {0}")]
    InvalidRequestData(String),

    /// The service failed internally (500).
    #[error("server error: {0}")]
    Server(String),

    /// The payload could not be navigated or hydrated.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The host transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The client configuration cannot produce a request URL.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    /// True for `InvalidRequest` and its narrower `InvalidRequestData` kind.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidRequest { .. } | ApiError::InvalidRequestData(_)
        )
    }
}
