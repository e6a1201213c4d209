//! ModelClass: a class-like value: prototype, statics, construction
//! function and the link to its parent class.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    model::{Attributes, Model},
    sync::SyncBackend,
};

use super::{
    extend::{checked_channels, extend, ProtoProps},
    prototype::{ConstructorFn, Prototype, UrlRoot},
};

static BASE: OnceLock<Arc<ModelClass>> = OnceLock::new();

pub struct ModelClass {
    name: String,
    prototype: Arc<Prototype>,
    parent: Option<Arc<ModelClass>>,
    constructor: Arc<ConstructorFn>,
    statics: RwLock<BTreeMap<String, Value>>,
}

impl ModelClass {
    /// The process-wide root class used by [`Model::new`].
    pub fn base() -> Arc<ModelClass> {
        Arc::clone(BASE.get_or_init(|| Self::root("Model")))
    }

    /// A fresh root class, independent from [`ModelClass::base`].
    pub fn root(name: impl Into<String>) -> Arc<ModelClass> {
        Arc::new(Self::from_parts(
            name.into(),
            Prototype::root(),
            None,
            Arc::new(initialize_model),
            BTreeMap::new(),
        ))
    }

    pub(crate) fn from_parts(
        name: String,
        prototype: Arc<Prototype>,
        parent: Option<Arc<ModelClass>>,
        constructor: Arc<ConstructorFn>,
        statics: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            name,
            prototype,
            parent,
            constructor,
            statics: RwLock::new(statics),
        }
    }

    /// Derive a subclass. See [`extend`].
    pub fn extend(self: &Arc<Self>, name: impl Into<String>, props: ProtoProps) -> Arc<ModelClass> {
        extend(self, name, props)
    }

    /// Allocate an instance of this class and run its construction function.
    pub fn create(self: &Arc<Self>, attrs: Attributes) -> Model {
        let model = Model::allocate(Arc::clone(self));
        self.construct(&model, attrs);
        model
    }

    /// Run this class's construction function on an already allocated model.
    /// Custom constructors use this on their parent class to chain up.
    pub fn construct(&self, model: &Model, attrs: Attributes) {
        (self.constructor)(model, attrs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prototype(&self) -> &Arc<Prototype> {
        &self.prototype
    }

    /// The parent class's prototype, for explicit calls to overridden behavior.
    pub fn super_prototype(&self) -> Option<&Arc<Prototype>> {
        self.prototype.parent()
    }

    pub fn parent(&self) -> Option<&Arc<ModelClass>> {
        self.parent.as_ref()
    }

    /// Whether this class is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &ModelClass) -> bool {
        std::iter::successors(Some(self), |c| c.parent.as_deref()).any(|c| std::ptr::eq(c, other))
    }

    // -----------------------------------------------------------------------
    // Statics
    // -----------------------------------------------------------------------

    pub fn static_value(&self, key: &str) -> Option<Value> {
        self.statics.read().get(key).cloned()
    }

    pub fn set_static(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.statics.write().insert(key.into(), value.into());
        self
    }

    /// Snapshot of every static property.
    pub fn statics(&self) -> BTreeMap<String, Value> {
        self.statics.read().clone()
    }

    // -----------------------------------------------------------------------
    // Prototype configuration
    // -----------------------------------------------------------------------

    pub fn id_attribute(&self) -> String {
        self.prototype.id_attribute()
    }

    pub fn set_id_attribute(&self, name: impl Into<String>) -> &Self {
        let name = name.into();
        self.prototype.update(|s| s.id_attribute = Some(name));
        self
    }

    pub fn set_url_root(&self, root: impl Into<UrlRoot>) -> &Self {
        let root = root.into();
        self.prototype.update(|s| s.url_root = Some(root));
        self
    }

    /// Declare an extra channel. Only instances created afterwards carry it.
    pub fn add_channel(&self, name: impl Into<String>) -> &Self {
        let name = name.into();
        let checked = checked_channels(&self.name, vec![name]);
        self.prototype.update(|s| {
            for channel in checked {
                if !s.channels.contains(&channel) {
                    s.channels.push(channel);
                }
            }
        });
        self
    }

    pub fn set_initialize(
        &self,
        f: impl Fn(&Model, &Attributes) + Send + Sync + 'static,
    ) -> &Self {
        self.prototype.update(|s| s.initialize = Some(Arc::new(f)));
        self
    }

    pub fn set_parse(
        &self,
        f: impl Fn(&Model, &Value) -> Attributes + Send + Sync + 'static,
    ) -> &Self {
        self.prototype.update(|s| s.parse = Some(Arc::new(f)));
        self
    }

    pub fn set_validate(
        &self,
        f: impl Fn(&Attributes) -> Option<Value> + Send + Sync + 'static,
    ) -> &Self {
        self.prototype.update(|s| s.validate = Some(Arc::new(f)));
        self
    }

    pub fn set_escape(&self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> &Self {
        self.prototype.update(|s| s.escape = Some(Arc::new(f)));
        self
    }

    pub fn set_sync(&self, backend: Arc<dyn SyncBackend>) -> &Self {
        self.prototype.update(|s| s.sync = Some(backend));
        self
    }

    /// Add a named method. An existing method of that name anywhere in the
    /// chain is kept unless `overwrite` is set.
    pub fn method(
        &self,
        name: impl Into<String>,
        f: impl Fn(&Model, &[Value]) -> Value + Send + Sync + 'static,
        overwrite: bool,
    ) -> &Self {
        let name = name.into();
        if overwrite || self.prototype.method(&name).is_none() {
            self.prototype.update(|s| {
                s.methods.insert(name, Arc::new(f));
            });
        }
        self
    }
}

/// Construction function of every root class: seed attributes silently, then
/// run the `initialize` hook.
fn initialize_model(model: &Model, attrs: Attributes) {
    model.seed(attrs.clone());
    if let Some(initialize) = model.class().prototype().initialize() {
        initialize(model, &attrs);
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("prototype", &self.prototype)
            .field("statics", &*self.statics.read())
            .finish()
    }
}
