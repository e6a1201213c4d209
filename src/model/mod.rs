//! Model: an attribute store whose mutations and sync lifecycle are
//! observable through a per-instance [`Dispatcher`].
//!
//! # Threading model
//!
//! `Model` is a cheap, cloneable handle (`Arc` inside) and is `Send + Sync`.
//! Attributes, the last validation error and the collection link each sit
//! behind their own `parking_lot::Mutex`. No lock is held while listeners,
//! hooks or the sync backend run, so all of them may call back into the model.
//!
//! # Modules
//!
//! - [`attributes`]: reads, writes, removal and store passthroughs.
//! - [`lifecycle`]: validation, `fetch` / `save` / `destroy`.
//! - [`url`]: endpoint resolution.

pub mod attributes;
pub mod lifecycle;
pub mod url;

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    class::ModelClass,
    error::DispatchError,
    reactive::{Dispatcher, ModelEvent, Rebind},
    util::unique_id,
};

/// Attribute name → value.
pub type Attributes = serde_json::Map<String, Value>;

/// The aggregate that owns a model. Models only hold a weak reference to it.
pub trait Collection: Send + Sync {
    /// Endpoint used when the model has no root URL of its own.
    fn url(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    cid: String,
    class: Arc<ModelClass>,
    attributes: Mutex<Attributes>,
    validation_error: Mutex<Option<Value>>,
    dispatch: Dispatcher<ModelEvent>,
    collection: Mutex<Option<Weak<dyn Collection>>>,
}

impl Model {
    /// A model of the root class ([`ModelClass::base`]).
    pub fn new(attrs: Attributes) -> Self {
        ModelClass::base().create(attrs)
    }

    /// A correctly linked, empty instance of `class`. The class runs its
    /// construction function on it afterwards.
    pub(crate) fn allocate(class: Arc<ModelClass>) -> Self {
        let dispatch = Dispatcher::from_checked(class.prototype().channels());
        Self {
            inner: Arc::new(ModelInner {
                cid: unique_id(Some("c")),
                class,
                attributes: Mutex::new(Attributes::new()),
                validation_error: Mutex::new(None),
                dispatch,
                collection: Mutex::new(None),
            }),
        }
    }

    /// Replace the attributes without emitting anything.
    pub(crate) fn seed(&self, attrs: Attributes) {
        *self.inner.attributes.lock() = attrs;
    }

    /// Process-unique client id, assigned at construction.
    pub fn cid(&self) -> &str {
        &self.inner.cid
    }

    pub fn class(&self) -> &Arc<ModelClass> {
        &self.inner.class
    }

    pub fn id_attribute(&self) -> String {
        self.inner.class.id_attribute()
    }

    /// Value of the id attribute.
    pub fn id(&self) -> Option<Value> {
        self.attr(&self.id_attribute())
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Collection link
    // -----------------------------------------------------------------------

    pub fn collection(&self) -> Option<Arc<dyn Collection>> {
        self.inner.collection.lock().as_ref().and_then(Weak::upgrade)
    }

    pub fn set_collection(&self, collection: &Arc<dyn Collection>) -> &Self {
        *self.inner.collection.lock() = Some(Arc::downgrade(collection));
        self
    }

    pub fn clear_collection(&self) -> &Self {
        *self.inner.collection.lock() = None;
        self
    }

    // -----------------------------------------------------------------------
    // Behavior
    // -----------------------------------------------------------------------

    /// A new instance of the same class seeded with a snapshot of the current
    /// attributes. Listeners and the collection link are not carried over.
    pub fn duplicate(&self) -> Model {
        self.inner.class.create(self.to_json())
    }

    /// Invoke the nearest method called `name`, if the class defines one.
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        let method = self.inner.class.prototype().method(name)?;
        Some(method(self, args))
    }

    /// Emit `payload` on a consumer-declared channel.
    pub fn trigger(&self, channel: &str, payload: Value) -> Result<&Self, DispatchError> {
        let event = ModelEvent::Custom {
            model: self.clone(),
            channel: channel.to_string(),
            payload,
        };
        self.inner.dispatch.call(channel, &event)?;
        Ok(self)
    }

    /// Emit one of the built-in events on its own channel.
    pub(crate) fn fire(&self, event: ModelEvent) {
        if let Err(e) = self.inner.dispatch.call(event.channel(), &event) {
            tracing::warn!(cid = %self.inner.cid, error = %e, "model event was not delivered");
        }
    }
}

impl Rebind for Model {
    type Event = ModelEvent;

    fn dispatch(&self) -> &Dispatcher<ModelEvent> {
        &self.inner.dispatch
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.inner.cid)
            .field("class", &self.inner.class.name())
            .field("attributes", &*self.inner.attributes.lock())
            .finish()
    }
}
