//! Attribute reads and writes. Writes emit `change`; the passthrough
//! accessors never emit anything.

use serde_json::Value;

use crate::{
    reactive::ModelEvent,
    util::{display_value, escape_html, same_value},
};

use super::{Attributes, Model};

impl Model {
    /// Snapshot of every attribute.
    pub fn to_json(&self) -> Attributes {
        self.inner.attributes.lock().clone()
    }

    /// Current value of `key`.
    pub fn attr(&self, key: &str) -> Option<Value> {
        self.inner.attributes.lock().get(key).cloned()
    }

    /// Write `key`, then emit `change` with the new value.
    ///
    /// Writing a value identical to the current one (see
    /// [`same_value`](crate::util::same_value)) does nothing.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        let key = key.into();
        let value = value.into();
        {
            let mut attrs = self.inner.attributes.lock();
            if attrs.get(&key).is_some_and(|current| same_value(current, &value)) {
                return self;
            }
            attrs.insert(key.clone(), value.clone());
        }
        self.fire(ModelEvent::Change {
            model: self.clone(),
            key,
            value: Some(value),
        });
        self
    }

    /// Write every entry of `attrs` through [`Model::set`], in key order.
    pub fn set_all(&self, attrs: Attributes) -> &Self {
        for (key, value) in attrs {
            self.set(key, value);
        }
        self
    }

    /// Delete `key`. Emits `change` with no value and returns `true` only
    /// when something was removed.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.inner.attributes.lock().remove(key).is_some();
        if removed {
            self.fire(ModelEvent::Change {
                model: self.clone(),
                key: key.to_string(),
                value: None,
            });
        }
        removed
    }

    /// HTML-escaped text of `key`. Absent and `null` values give `""`.
    pub fn escape(&self, key: &str) -> String {
        let text = self.attr(key).map(|v| display_value(&v)).unwrap_or_default();
        match self.inner.class.prototype().escape() {
            Some(escape) => escape(&text),
            None => escape_html(&text),
        }
    }

    // -----------------------------------------------------------------------
    // Store passthroughs
    // -----------------------------------------------------------------------

    pub fn has(&self, key: &str) -> bool {
        self.inner.attributes.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.attributes.lock().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.inner.attributes.lock().values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .attributes
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.attributes.lock().is_empty()
    }

    pub fn size(&self) -> usize {
        self.inner.attributes.lock().len()
    }
}
