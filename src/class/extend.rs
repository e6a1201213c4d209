//! Class derivation: [`ProtoProps`] describes what a subclass adds, [`extend`]
//! wires it onto a parent class.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    model::{Attributes, Model},
    reactive::dispatcher::is_legal_channel,
    sync::SyncBackend,
};

use super::{
    model_class::ModelClass,
    prototype::{ConstructorFn, Prototype, Slots, UrlRoot},
};

// ============================================================================
// ProtoProps
// ============================================================================

/// Prototype properties for a derived class. Anything left unset is
/// inherited from the parent.
#[derive(Default)]
pub struct ProtoProps {
    pub(crate) constructor: Option<Arc<ConstructorFn>>,
    pub(crate) slots: Slots,
}

impl ProtoProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the construction function. It receives an allocated but
    /// unseeded model; call [`ModelClass::construct`] on the parent to chain.
    pub fn constructor(
        mut self,
        f: impl Fn(&Model, Attributes) + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(f));
        self
    }

    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.slots.id_attribute = Some(name.into());
        self
    }

    pub fn url_root(mut self, root: impl Into<UrlRoot>) -> Self {
        self.slots.url_root = Some(root.into());
        self
    }

    /// Declare an extra channel on instances of the class.
    pub fn channel(mut self, name: impl Into<String>) -> Self {
        self.slots.channels.push(name.into());
        self
    }

    pub fn initialize(
        mut self,
        f: impl Fn(&Model, &Attributes) + Send + Sync + 'static,
    ) -> Self {
        self.slots.initialize = Some(Arc::new(f));
        self
    }

    pub fn parse(
        mut self,
        f: impl Fn(&Model, &Value) -> Attributes + Send + Sync + 'static,
    ) -> Self {
        self.slots.parse = Some(Arc::new(f));
        self
    }

    pub fn validate(
        mut self,
        f: impl Fn(&Attributes) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.slots.validate = Some(Arc::new(f));
        self
    }

    pub fn escape(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.slots.escape = Some(Arc::new(f));
        self
    }

    pub fn sync(mut self, backend: Arc<dyn SyncBackend>) -> Self {
        self.slots.sync = Some(backend);
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Model, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.slots.methods.insert(name.into(), Arc::new(f));
        self
    }
}

// ============================================================================
// extend
// ============================================================================

/// Derive a subclass of `parent`.
///
/// - The child's constructor is `props.constructor`, or one that delegates to
///   the parent's construction function.
/// - Parent statics are copied key by key; later changes on either side stay
///   on that side.
/// - The child prototype links to the parent prototype without running any
///   constructor, and `super_prototype()` points at the parent prototype.
pub fn extend(parent: &Arc<ModelClass>, name: impl Into<String>, props: ProtoProps) -> Arc<ModelClass> {
    let name = name.into();
    let ProtoProps {
        constructor,
        mut slots,
    } = props;

    slots.channels = checked_channels(&name, slots.channels);

    let constructor = constructor.unwrap_or_else(|| {
        let parent = Arc::clone(parent);
        let delegate: Arc<ConstructorFn> =
            Arc::new(move |model: &Model, attrs: Attributes| parent.construct(model, attrs));
        delegate
    });

    let prototype = Prototype::derive(parent.prototype(), slots);

    tracing::debug!(class = %name, parent = %parent.name(), "derived model class");

    Arc::new(ModelClass::from_parts(
        name,
        prototype,
        Some(Arc::clone(parent)),
        constructor,
        parent.statics(),
    ))
}

/// Drop illegal and duplicate channel names.
pub(crate) fn checked_channels(class: &str, channels: Vec<String>) -> Vec<String> {
    let mut checked: Vec<String> = Vec::with_capacity(channels.len());
    for channel in channels {
        if !is_legal_channel(&channel) {
            tracing::warn!(class = %class, channel = %channel, "ignoring illegal channel name");
            continue;
        }
        if !checked.contains(&channel) {
            checked.push(channel);
        }
    }
    checked
}
