//! Rebind: exposes a host's internal [`Dispatcher`] through the host itself.
//!
//! Any type that owns a dispatcher implements [`Rebind::dispatch`] and gets a
//! uniform `on()` get/set/remove operation. Results that would hand back the
//! dispatcher are normalized to the host so calls chain at the host level.
//!
//! The special typename [`ALL`] fans a single listener out over every channel
//! by registering it under the `all` name on each of them.

use std::sync::Arc;

use crate::error::DispatchError;

use super::dispatcher::{ChannelListenerFn, Dispatcher, ListenerFn};

/// Typename that addresses every channel of the dispatcher at once.
pub const ALL: &str = "all";

const ALL_NAMESPACE: &str = ".all";

/// What `on()` should do with the given typename.
pub enum Listen<E> {
    /// Read the registered listener.
    Get,
    /// Remove the registered listener.
    Remove,
    /// Register a listener that receives the event as-is.
    Set(Arc<ListenerFn<E>>),
    /// Register a listener that receives the originating channel name first.
    SetAll(Arc<ChannelListenerFn<E>>),
}

/// Result of [`Rebind::on`]: the host for fluent writes, the listener for reads.
pub enum Bound<'a, H: ?Sized, E> {
    Host(&'a H),
    Listener(Option<Arc<ListenerFn<E>>>),
}

impl<'a, H: ?Sized, E> Bound<'a, H, E> {
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }

    pub fn into_listener(self) -> Option<Arc<ListenerFn<E>>> {
        match self {
            Self::Host(_) => None,
            Self::Listener(l) => l,
        }
    }
}

pub trait Rebind {
    type Event: 'static;

    fn dispatch(&self) -> &Dispatcher<Self::Event>;

    /// Get, set or remove a listener.
    ///
    /// With [`ALL`]:
    /// - `Get` returns the `all` listener of the first channel only.
    /// - `Remove` removes the `all` listener from every channel.
    /// - `Set`/`SetAll` register under `all` on every channel; `SetAll`
    ///   listeners get the firing channel's name ahead of the event.
    ///
    /// Any other typename is forwarded to the dispatcher unchanged.
    fn on(
        &self,
        typename: &str,
        listen: Listen<Self::Event>,
    ) -> Result<Bound<'_, Self, Self::Event>, DispatchError> {
        let dispatch = self.dispatch();

        if typename == ALL {
            let every = dispatch
                .channels()
                .iter()
                .map(|c| format!("{c}{ALL_NAMESPACE}"))
                .collect::<Vec<_>>()
                .join(" ");
            return match listen {
                Listen::Get => {
                    let listener = match dispatch.channels().first() {
                        Some(first) => dispatch.listener(&format!("{first}{ALL_NAMESPACE}"))?,
                        None => None,
                    };
                    Ok(Bound::Listener(listener))
                }
                Listen::Remove => host(self, dispatch, dispatch.on(ALL_NAMESPACE, None)?),
                Listen::Set(f) => host(self, dispatch, dispatch.on(&every, Some(f))?),
                Listen::SetAll(f) => host(self, dispatch, dispatch.on_named(&every, f)?),
            };
        }

        match listen {
            Listen::Get => Ok(Bound::Listener(dispatch.listener(typename)?)),
            Listen::Remove => host(self, dispatch, dispatch.on(typename, None)?),
            Listen::Set(f) => host(self, dispatch, dispatch.on(typename, Some(f))?),
            Listen::SetAll(f) => host(self, dispatch, dispatch.on_named(typename, f)?),
        }
    }

    /// Register `listener` under `typename`.
    fn listen(
        &self,
        typename: &str,
        listener: impl Fn(&Self::Event) + Send + Sync + 'static,
    ) -> Result<&Self, DispatchError> {
        self.on(typename, Listen::Set(Arc::new(listener)))?;
        Ok(self)
    }

    /// Observe every channel; `listener` receives the channel name first.
    fn listen_all(
        &self,
        listener: impl Fn(&str, &Self::Event) + Send + Sync + 'static,
    ) -> Result<&Self, DispatchError> {
        self.on(ALL, Listen::SetAll(Arc::new(listener)))?;
        Ok(self)
    }

    /// Remove the listener(s) under `typename`.
    fn unlisten(&self, typename: &str) -> Result<&Self, DispatchError> {
        self.on(typename, Listen::Remove)?;
        Ok(self)
    }

    /// The listener currently registered under `typename`.
    fn listener(
        &self,
        typename: &str,
    ) -> Result<Option<Arc<ListenerFn<Self::Event>>>, DispatchError> {
        Ok(self.on(typename, Listen::Get)?.into_listener())
    }
}

// The dispatcher's fluent return is swapped for the host.
fn host<'a, H: ?Sized, E>(
    host: &'a H,
    dispatch: &Dispatcher<E>,
    returned: &Dispatcher<E>,
) -> Result<Bound<'a, H, E>, DispatchError> {
    debug_assert!(std::ptr::eq(dispatch, returned));
    Ok(Bound::Host(host))
}
