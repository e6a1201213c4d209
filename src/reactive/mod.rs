//! Reactive layer: channel dispatch for models.
//!
//! # Modules
//!
//! - [`dispatcher`]: Generic multi-channel pub/sub ([`Dispatcher<E>`]).
//! - [`rebind`]: [`Rebind`], the host-level `on()` with `"all"` fan-out.
//! - [`event`]: [`ModelEvent`] and the default channel names.

pub mod dispatcher;
pub mod event;
pub mod rebind;

pub use dispatcher::{ChannelListenerFn, Dispatcher, ListenerFn};
pub use event::{ModelEvent, CHANGE, DEFAULT_CHANNELS, DESTROY, INVALID, SYNC};
pub use rebind::{Bound, Listen, Rebind, ALL};
