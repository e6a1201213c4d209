use std::fmt;
use thiserror::Error;

use serde_json::Value;

// ---------------------------------------------------------------------------
// ConfigurationError
// ---------------------------------------------------------------------------

/// Raised synchronously when a model is missing configuration an operation needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error(r#"A "url" property or function must be specified"#)]
    MissingUrl,

    #[error("No sync backend configured for model class \"{class}\"")]
    MissingSync { class: String },
}

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Illegal channel name: \"{0}\"")]
    IllegalChannel(String),

    #[error("Unknown channel: \"{0}\"")]
    UnknownChannel(String),
}

// ---------------------------------------------------------------------------
// SyncError
// ---------------------------------------------------------------------------

/// Classification of sync errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// Retriable (network, temporary failures)
    Transient,
    /// Not retriable (rejected by the server, malformed request)
    Permanent,
    /// Authentication failed
    Auth,
}

/// Error reported by a sync backend. Never raised by the model itself: it is
/// handed verbatim to the completion callback and then returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncError {
    pub message: String,
    pub kind: SyncErrorKind,
    /// Optional structured body returned alongside the failure.
    pub payload: Option<Value>,
}

impl SyncError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: SyncErrorKind::Transient,
            payload: None,
        }
    }

    pub fn with_kind(message: impl Into<String>, kind: SyncErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sync failed: {}", self.message)
    }
}

impl std::error::Error for SyncError {}

// ---------------------------------------------------------------------------
// ModelError: top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Convenience alias: the default error type is `ModelError`.
pub type Result<T, E = ModelError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
