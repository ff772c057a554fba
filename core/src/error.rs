//! Error types for the todo store.
//!
//! # Design
//! `ApiError` describes why a single remote round-trip failed. `NotFound`
//! gets a dedicated variant because it is the one status callers tend to
//! distinguish; every other non-2xx response lands in `Http` with the raw
//! status and body for debugging.
//!
//! `ErrorKind` is the flat classification shown to the user. The controller
//! maps every `ApiError` onto exactly one kind at the operation boundary, so
//! nothing below the store ever reaches the presentation layer directly.

use thiserror::Error;

use crate::store::Ticket;

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host could not complete the round-trip at all.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// User-facing failure classification. At most one is active at a time.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[error("Unable to load todos")]
    Load,
    #[error("Unable to add a todo")]
    Add,
    #[error("Unable to update a todo")]
    Update,
    #[error("Unable to delete a todo")]
    Delete,
    #[error("Title should not be empty")]
    EmptyTitle,
}

/// Misuse of the controller by its host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no request in flight for ticket {0}")]
    UnknownTicket(Ticket),
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}
