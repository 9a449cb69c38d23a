//! Error types for the recipe client.
//!
//! # Design
//! Three kinds of failure reach callers: bad input caught before any request
//! is sent (`Validation`), a referenced recipe the server does not have
//! (`NotFound`, raised by the existence pre-check of update and delete), and
//! everything that went wrong on the wire (`Transport`). The resource client
//! only ever produces `TransportError`; the operation handlers add the other
//! two.

use thiserror::Error;

/// Failures of a single HTTP round-trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connection refused, reset, ...).
    #[error("network failure: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Encode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by the operation handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("recipe {id} does not exist")]
    NotFound { id: u64 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
