//! Errors surfaced by [`Store`](crate::Store)

use thiserror::Error;

/// Failure of a store operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store no longer accepts actions
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// No matching action arrived in time
    #[error("Timeout waiting for action")]
    Timeout,

    /// The action broadcast has no sender left
    #[error("Action broadcast channel closed")]
    ChannelClosed,
}
