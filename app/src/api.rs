//! Item store client interface.
//!
//! The reducer talks to the remote collection only through [`TodoApi`];
//! the production implementation is [`crate::http::HttpTodoApi`], tests use
//! in-memory fakes.

use crate::types::{Todo, TodoDraft, TodoId, TodoPatch};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a request to the remote collection
///
/// Cloneable so it can travel inside result actions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request could not be sent or no response arrived
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response body did not decode
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

/// Request/response operations on the remote collection
///
/// Every operation is scoped to the owner the implementation was built for.
/// No retries: failures are returned as they happen.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// List the owner's items
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;

    /// Create an item; the server assigns the id
    async fn create(&self, draft: TodoDraft) -> Result<Todo, ApiError>;

    /// Replace the given fields of an item
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, ApiError>;

    /// Delete an item
    async fn delete(&self, id: TodoId) -> Result<(), ApiError>;
}
