//! Prototype: shared instance behavior with a link to the parent prototype.
//!
//! Every slot is optional. Reads walk the chain from the most specific
//! prototype towards the root and return the first slot that is set, so a
//! class inherits everything its ancestors define unless it shadows it.
//! Slots are behind a lock: changing an ancestor later is visible to every
//! descendant and every live instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    model::{Attributes, Model},
    reactive::DEFAULT_CHANNELS,
    sync::SyncBackend,
};

// ============================================================================
// Hook types
// ============================================================================

/// Runs the construction logic on a freshly allocated model.
pub type ConstructorFn = dyn Fn(&Model, Attributes) + Send + Sync;

/// Runs once at construction with the seed attributes.
pub type InitializeFn = dyn Fn(&Model, &Attributes) + Send + Sync;

/// Converts a raw sync response into the attributes to apply.
pub type ParseFn = dyn Fn(&Model, &Value) -> Attributes + Send + Sync;

/// Returns a truthy error value when `attributes` are invalid.
pub type ValidateFn = dyn Fn(&Attributes) -> Option<Value> + Send + Sync;

/// Produces HTML-safe text.
pub type EscapeFn = dyn Fn(&str) -> String + Send + Sync;

/// A named instance method.
pub type MethodFn = dyn Fn(&Model, &[Value]) -> Value + Send + Sync;

/// Computes the root URL for a model.
pub type UrlResolverFn = dyn Fn(&Model) -> Option<String> + Send + Sync;

/// Root endpoint for a model class: a fixed string or a resolver.
#[derive(Clone)]
pub enum UrlRoot {
    Static(String),
    Resolver(Arc<UrlResolverFn>),
}

impl UrlRoot {
    pub fn resolver(f: impl Fn(&Model) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Resolver(Arc::new(f))
    }

    /// Resolve against `model`. Empty strings count as unresolved.
    pub fn resolve(&self, model: &Model) -> Option<String> {
        let url = match self {
            Self::Static(url) => Some(url.clone()),
            Self::Resolver(f) => f(model),
        };
        url.filter(|u| !u.is_empty())
    }
}

impl From<&str> for UrlRoot {
    fn from(url: &str) -> Self {
        Self::Static(url.to_string())
    }
}

impl From<String> for UrlRoot {
    fn from(url: String) -> Self {
        Self::Static(url)
    }
}

impl fmt::Debug for UrlRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(url) => f.debug_tuple("Static").field(url).finish(),
            Self::Resolver(_) => f.debug_tuple("Resolver").field(&"<fn>").finish(),
        }
    }
}

// ============================================================================
// Slots
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct Slots {
    pub(crate) id_attribute: Option<String>,
    pub(crate) url_root: Option<UrlRoot>,
    /// Channels declared at this level, on top of the inherited ones.
    pub(crate) channels: Vec<String>,
    pub(crate) initialize: Option<Arc<InitializeFn>>,
    pub(crate) parse: Option<Arc<ParseFn>>,
    pub(crate) validate: Option<Arc<ValidateFn>>,
    pub(crate) escape: Option<Arc<EscapeFn>>,
    pub(crate) sync: Option<Arc<dyn SyncBackend>>,
    pub(crate) methods: BTreeMap<String, Arc<MethodFn>>,
}

// ============================================================================
// Prototype
// ============================================================================

pub struct Prototype {
    parent: Option<Arc<Prototype>>,
    slots: RwLock<Slots>,
}

impl Prototype {
    pub(crate) fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            slots: RwLock::new(Slots::default()),
        })
    }

    /// Link a fresh prototype to `parent`. Nothing from `parent` is copied.
    pub(crate) fn derive(parent: &Arc<Prototype>, slots: Slots) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            slots: RwLock::new(slots),
        })
    }

    pub fn parent(&self) -> Option<&Arc<Prototype>> {
        self.parent.as_ref()
    }

    /// Whether `other` is this prototype or one of its ancestors.
    pub fn inherits_from(&self, other: &Prototype) -> bool {
        self.chain().any(|p| std::ptr::eq(p, other))
    }

    pub fn id_attribute(&self) -> String {
        self.lookup(|s| s.id_attribute.clone())
            .unwrap_or_else(|| "id".to_string())
    }

    pub fn url_root(&self) -> Option<UrlRoot> {
        self.lookup(|s| s.url_root.clone())
    }

    /// Default channels followed by every declared channel, ancestors first.
    pub fn channels(&self) -> Vec<String> {
        let mut levels: Vec<Vec<String>> = self
            .chain()
            .map(|p| p.slots.read().channels.clone())
            .collect();
        levels.reverse();

        let mut channels: Vec<String> = DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect();
        for channel in levels.into_iter().flatten() {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        channels
    }

    pub fn initialize(&self) -> Option<Arc<InitializeFn>> {
        self.lookup(|s| s.initialize.clone())
    }

    pub fn parse(&self) -> Option<Arc<ParseFn>> {
        self.lookup(|s| s.parse.clone())
    }

    pub fn validate(&self) -> Option<Arc<ValidateFn>> {
        self.lookup(|s| s.validate.clone())
    }

    pub fn escape(&self) -> Option<Arc<EscapeFn>> {
        self.lookup(|s| s.escape.clone())
    }

    pub fn sync(&self) -> Option<Arc<dyn SyncBackend>> {
        self.lookup(|s| s.sync.clone())
    }

    /// The nearest method called `name`.
    pub fn method(&self, name: &str) -> Option<Arc<MethodFn>> {
        self.lookup(|s| s.methods.get(name).cloned())
    }

    /// Every method name visible from this prototype.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .chain()
            .flat_map(|p| p.slots.read().methods.keys().cloned().collect::<Vec<_>>())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut Slots)) {
        f(&mut *self.slots.write());
    }

    fn chain(&self) -> impl Iterator<Item = &Prototype> {
        std::iter::successors(Some(self), |p| p.parent.as_deref())
    }

    fn lookup<T>(&self, read: impl Fn(&Slots) -> Option<T>) -> Option<T> {
        self.chain().find_map(|p| read(&*p.slots.read()))
    }
}

impl fmt::Debug for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read();
        f.debug_struct("Prototype")
            .field("id_attribute", &slots.id_attribute)
            .field("url_root", &slots.url_root)
            .field("channels", &slots.channels)
            .field("methods", &slots.methods.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
