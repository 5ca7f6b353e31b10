//! Error types for the todo API client and store.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging.
//!
//! `StoreError` is what `TodoStore` operations return. By the time a caller
//! sees one it has already been reported to the notification sink.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by `TodoClient` parse methods and `TodoService` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404, the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connect, timeout, reset).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Input rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("todo title is required")]
    EmptyTitle,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ApiError),

    /// The intent named a todo that is not in the local collection.
    #[error("todo {0} is not in the local collection")]
    UnknownTodo(Uuid),

    /// The store was detached while the call was in flight; the response was
    /// discarded.
    #[error("store detached, response discarded")]
    Detached,
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_service(&self) -> bool {
        matches!(self, StoreError::Service(_))
    }
}
