//! ModelEvent: payloads delivered on a model's channels.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::{Collection, Model};

pub const SYNC: &str = "sync";
pub const CHANGE: &str = "change";
pub const DESTROY: &str = "destroy";
pub const INVALID: &str = "invalid";

/// Channels every model dispatcher carries, in declaration order.
pub const DEFAULT_CHANNELS: [&str; 4] = [SYNC, CHANGE, DESTROY, INVALID];

/// An event emitted by a [`Model`].
#[derive(Clone)]
pub enum ModelEvent {
    /// An attribute was written (`Some`) or removed (`None`).
    Change {
        model: Model,
        key: String,
        value: Option<Value>,
    },
    /// A sync operation completed successfully.
    Sync { model: Model, response: Value },
    /// The model is being destroyed. Carries the owning collection, if any.
    Destroy {
        model: Model,
        collection: Option<Arc<dyn Collection>>,
    },
    /// Validation failed with `error`.
    Invalid { model: Model, error: Value },
    /// Emitted through [`Model::trigger`] on a consumer-declared channel.
    Custom {
        model: Model,
        channel: String,
        payload: Value,
    },
}

impl ModelEvent {
    /// The channel this event is emitted on.
    pub fn channel(&self) -> &str {
        match self {
            Self::Change { .. } => CHANGE,
            Self::Sync { .. } => SYNC,
            Self::Destroy { .. } => DESTROY,
            Self::Invalid { .. } => INVALID,
            Self::Custom { channel, .. } => channel,
        }
    }

    /// The model that emitted the event.
    pub fn model(&self) -> &Model {
        match self {
            Self::Change { model, .. }
            | Self::Sync { model, .. }
            | Self::Destroy { model, .. }
            | Self::Invalid { model, .. }
            | Self::Custom { model, .. } => model,
        }
    }
}

impl fmt::Debug for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change { model, key, value } => f
                .debug_struct("Change")
                .field("model", &model.cid())
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::Sync { model, response } => f
                .debug_struct("Sync")
                .field("model", &model.cid())
                .field("response", response)
                .finish(),
            Self::Destroy { model, collection } => f
                .debug_struct("Destroy")
                .field("model", &model.cid())
                .field("collection", &collection.as_ref().map(|_| "<collection>"))
                .finish(),
            Self::Invalid { model, error } => f
                .debug_struct("Invalid")
                .field("model", &model.cid())
                .field("error", error)
                .finish(),
            Self::Custom {
                model,
                channel,
                payload,
            } => f
                .debug_struct("Custom")
                .field("model", &model.cid())
                .field("channel", channel)
                .field("payload", payload)
                .finish(),
        }
    }
}
