//! Error types for the Route 53 provider
//!
//! This module defines all error types used throughout the crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Route 53 provider
#[derive(Error, Debug)]
pub enum Error {
    /// A Route 53 API call failed
    #[error("Route 53 {operation} failed{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        /// API operation name (e.g., "ChangeResourceRecordSets")
        operation: String,
        /// Service error code, when the service returned one
        code: Option<String>,
        /// Error message
        message: String,
    },

    /// The remote object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote object already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Request was throttled or collided with a change still in flight
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// A waiter gave up before the target state was reached
    #[error("Timed out after {waited:?} waiting for {what} (last state: {})", .last_state.as_deref().unwrap_or("unknown"))]
    Timeout {
        /// What was being waited for
        what: String,
        /// How long the waiter ran
        waited: Duration,
        /// Last state observed, if any
        last_state: Option<String>,
    },

    /// A waiter observed a state that is neither pending nor a target
    #[error("Unexpected state {state} for {what} (expected one of: {})", .expected.join(", "))]
    UnexpectedState {
        /// What was being waited for
        what: String,
        /// The state that was observed
        state: String,
        /// States that would have been accepted
        expected: Vec<String>,
    },

    /// The object was created but a later step of the create failed
    #[error("{what} {id} was created but not finished: {source}")]
    Incomplete {
        /// Kind of object
        what: String,
        /// Remote ID of the created object
        id: String,
        /// The failure after creation
        source: Box<Error>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an API error
    pub fn api(
        operation: impl Into<String>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an "already exists" error
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Create a throttling error
    pub fn throttled(msg: impl Into<String>) -> Self {
        Self::Throttled(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Wrap a failure that happened after `id` was created
    pub fn incomplete(what: impl Into<String>, id: impl Into<String>, source: Error) -> Self {
        Self::Incomplete {
            what: what.into(),
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error means the remote object is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether repeating the same call later may succeed
    ///
    /// Only throttling is retryable. Route 53 reports a change that is
    /// still being applied to the same zone as `PriorRequestNotComplete`,
    /// which the provider adapters map to [`Error::Throttled`] as well.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
