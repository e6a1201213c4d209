//! Dispatcher<E>: a named, multi-channel pub/sub primitive.
//!
//! Channels are fixed at construction. Each channel keeps an ordered list of
//! named listeners; registering under a name that is already taken replaces
//! that listener in place of appending a second one.
//!
//! Typenames follow the `channel.name` convention and may list several
//! whitespace-separated entries (`"change.view sync.view"`). A typename with
//! an empty channel part (`".view"`) addresses that name on every channel,
//! which is only meaningful for removal.
//!
//! Snapshot-on-call semantics, as with any emitter in this crate:
//!   - A listener removed *during* a call is still invoked in that round.
//!   - A listener added *during* a call is NOT invoked until the next call.
//!
//! All methods take `&self`. The internal `parking_lot::Mutex` is never held
//! while listeners run, so listeners may call `on()` re-entrantly.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::DispatchError;

/// Closure type for channel listeners.
pub type ListenerFn<E> = dyn Fn(&E) + Send + Sync;

/// Closure type for listeners that also receive the channel name.
pub type ChannelListenerFn<E> = dyn Fn(&str, &E) + Send + Sync;

type Slot<E> = (String, Arc<ListenerFn<E>>);

static CHANNEL_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn channel_regex() -> &'static regex::Regex {
    CHANNEL_REGEX.get_or_init(|| regex::Regex::new(r"^[^\s.]+$").expect("channel regex is valid"))
}

/// Whether `name` can be used as a channel: non-empty, no whitespace, no `.`.
pub fn is_legal_channel(name: &str) -> bool {
    channel_regex().is_match(name)
}

/// A parsed `channel.name` entry. `channel` is `None` for `.name` entries.
struct Typename {
    channel: Option<usize>,
    name: String,
}

/// Typed synchronous multi-channel dispatcher.
pub struct Dispatcher<E> {
    names: Vec<String>,
    /// Listener lists, parallel to `names`.
    slots: Mutex<Vec<Vec<Slot<E>>>>,
}

impl<E> Dispatcher<E> {
    /// Create a dispatcher with the given channels, in order.
    ///
    /// Channel names must be non-empty, contain no whitespace or `.`, and be
    /// unique.
    pub fn new<I, S>(channels: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for channel in channels {
            let channel = channel.into();
            if !is_legal_channel(&channel) || names.contains(&channel) {
                return Err(DispatchError::IllegalChannel(channel));
            }
            names.push(channel);
        }
        Ok(Self::from_checked(names))
    }

    /// Build from names already known to be legal and unique.
    pub(crate) fn from_checked(names: Vec<String>) -> Self {
        let slots = names.iter().map(|_| Vec::new()).collect();
        Self {
            names,
            slots: Mutex::new(slots),
        }
    }

    /// Channel names in declaration order.
    pub fn channels(&self) -> &[String] {
        &self.names
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.names.iter().any(|n| n == channel)
    }

    /// Number of listeners on `channel` (0 for unknown channels).
    pub fn listener_count(&self, channel: &str) -> usize {
        match self.index_of(channel) {
            Some(i) => self.slots.lock()[i].len(),
            None => 0,
        }
    }

    /// Register (`Some`) or remove (`None`) a listener for every entry in
    /// `typenames`. Returns the dispatcher for chaining.
    pub fn on(
        &self,
        typenames: &str,
        listener: Option<Arc<ListenerFn<E>>>,
    ) -> Result<&Self, DispatchError> {
        let parsed = self.parse(typenames)?;
        let mut slots = self.slots.lock();
        for typename in parsed {
            match (typename.channel, &listener) {
                (Some(i), l) => set(&mut slots[i], &typename.name, l.clone()),
                (None, None) => {
                    for list in slots.iter_mut() {
                        set(list, &typename.name, None);
                    }
                }
                // Adding a listener needs a concrete channel.
                (None, Some(_)) => {}
            }
        }
        Ok(self)
    }

    /// Register a listener that receives the originating channel name ahead
    /// of the event, once per listed channel.
    pub fn on_named(
        &self,
        typenames: &str,
        listener: Arc<ChannelListenerFn<E>>,
    ) -> Result<&Self, DispatchError>
    where
        E: 'static,
    {
        let parsed = self.parse(typenames)?;
        let mut slots = self.slots.lock();
        for typename in parsed {
            let Some(i) = typename.channel else { continue };
            let channel = self.names[i].clone();
            let inner = Arc::clone(&listener);
            let wrapper: Arc<ListenerFn<E>> = Arc::new(move |event: &E| inner(&channel, event));
            set(&mut slots[i], &typename.name, Some(wrapper));
        }
        Ok(self)
    }

    /// The listener registered under the first matching `channel.name` entry.
    pub fn listener(&self, typenames: &str) -> Result<Option<Arc<ListenerFn<E>>>, DispatchError> {
        let parsed = self.parse(typenames)?;
        let slots = self.slots.lock();
        for typename in parsed {
            let Some(i) = typename.channel else { continue };
            if let Some((_, cb)) = slots[i].iter().find(|(n, _)| *n == typename.name) {
                return Ok(Some(Arc::clone(cb)));
            }
        }
        Ok(None)
    }

    /// Invoke every listener on `channel` with `event`, in registration order.
    pub fn call(&self, channel: &str, event: &E) -> Result<(), DispatchError> {
        let i = self
            .index_of(channel)
            .ok_or_else(|| DispatchError::UnknownChannel(channel.to_string()))?;
        // Snapshot Arc references under the lock, then release it before calling out.
        let snapshot: Vec<Arc<ListenerFn<E>>> = {
            let slots = self.slots.lock();
            slots[i].iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in snapshot {
            cb(event);
        }
        Ok(())
    }

    /// A new dispatcher with the same channels and listeners.
    pub fn copy(&self) -> Self {
        Self {
            names: self.names.clone(),
            slots: Mutex::new(self.slots.lock().clone()),
        }
    }

    fn index_of(&self, channel: &str) -> Option<usize> {
        self.names.iter().position(|n| n == channel)
    }

    fn parse(&self, typenames: &str) -> Result<Vec<Typename>, DispatchError> {
        typenames
            .split_whitespace()
            .map(|token| {
                let (channel, name) = token.split_once('.').unwrap_or((token, ""));
                let channel = if channel.is_empty() {
                    None
                } else {
                    Some(
                        self.index_of(channel)
                            .ok_or_else(|| DispatchError::UnknownChannel(channel.to_string()))?,
                    )
                };
                Ok(Typename {
                    channel,
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

fn set<E>(list: &mut Vec<Slot<E>>, name: &str, listener: Option<Arc<ListenerFn<E>>>) {
    if let Some(pos) = list.iter().position(|(n, _)| n == name) {
        list.remove(pos);
    }
    if let Some(cb) = listener {
        list.push((name.to_string(), cb));
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        let mut map = f.debug_map();
        for (name, list) in self.names.iter().zip(slots.iter()) {
            let names: Vec<&str> = list.iter().map(|(n, _)| n.as_str()).collect();
            map.entry(name, &names);
        }
        map.finish()
    }
}
