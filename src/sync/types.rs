//! Sync-specific types: the backend trait models delegate network work to,
//! the verbs it is called with, and the results a sync operation reports.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::SyncError, model::Model};

// ============================================================================
// SyncBackend: user-provided network layer
// ============================================================================

/// User-implemented transport that performs the actual create/read/update/
/// delete for a model.
///
/// Resolving the returned future is the single completion of the request:
/// `Ok` carries the raw response, `Err` is handed to the caller untouched.
/// Timeouts and retries belong to the implementation. The model stays fully
/// usable while a request is in flight; overlapping requests on one model
/// complete in no particular order.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    async fn sync(&self, verb: SyncVerb, model: &Model) -> Result<Value, SyncError>;
}

// ============================================================================
// Verbs / Options / Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncVerb {
    Create,
    Read,
    Update,
    Delete,
}

impl SyncVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied completion: `Ok(response)` on success (`None` when the
/// backend was never contacted), `Err(error)` when the backend failed.
pub type Completion =
    Box<dyn FnOnce(&Model, Result<Option<&Value>, &SyncError>) + Send + 'static>;

/// Box a closure as a [`Completion`].
pub fn completion<F>(f: F) -> Option<Completion>
where
    F: FnOnce(&Model, Result<Option<&Value>, &SyncError>) + Send + 'static,
{
    Some(Box::new(f))
}

/// What a sync operation did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The backend answered with this raw response.
    Synced(Value),
    /// `save` found the model invalid and did nothing.
    Invalid,
    /// `destroy` on a model that was never persisted; no request was made.
    Local,
}

impl SyncOutcome {
    pub fn response(&self) -> Option<&Value> {
        match self {
            Self::Synced(response) => Some(response),
            Self::Invalid | Self::Local => None,
        }
    }
}

/// Options for [`Model::destroy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Emit `destroy` only after the backend confirms the delete.
    pub wait: bool,
}

impl DestroyOptions {
    pub fn wait() -> Self {
        Self { wait: true }
    }
}
