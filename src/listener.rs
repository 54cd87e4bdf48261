use std::any::TypeId;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tracing::{trace, warn};

use crate::event_emitter::Registry;
use crate::{AsyncCallback, Callback, EventPayload, FallibleCallback, ListenerError};

/// Identity of a registered callback: the address of its `Arc` allocation.
///
/// Two listeners are the same listener iff they were built from the same `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Identity of the callback held by `callback`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use typed_events::{Callback, ListenerId};
    ///
    /// let a: Callback<u8> = Arc::new(|_| {});
    /// let b: Callback<u8> = Arc::new(|_| {});
    /// assert_eq!(ListenerId::of(&a), ListenerId::of(&a.clone()));
    /// assert_ne!(ListenerId::of(&a), ListenerId::of(&b));
    /// ```
    pub fn of<C: ?Sized>(callback: &Arc<C>) -> Self {
        Self(Arc::as_ptr(callback) as *const () as usize)
    }
}

enum Handler<P> {
    Plain(Callback<P>),
    Fallible(FallibleCallback<P>),
    Async(AsyncCallback<P>),
}

/// A handle for a registered event callback.
///
/// `Listener<P>` wraps one of the three callback kinds. Equality is identity of the
/// wrapped `Arc`, never of the closure's behaviour.
pub struct Listener<P> {
    handler: Handler<P>,
}

impl<P: Send + Sync + 'static> Listener<P> {
    /// Wraps a plain callback.
    pub fn new(callback: Callback<P>) -> Self {
        Self { handler: Handler::Plain(callback) }
    }

    /// Wraps a callback whose `Err` aborts the emission in progress.
    pub fn fallible(callback: FallibleCallback<P>) -> Self {
        Self { handler: Handler::Fallible(callback) }
    }

    /// Wraps a callback returning a future, spawned on the current tokio runtime when called.
    pub fn asynchronous(callback: AsyncCallback<P>) -> Self {
        Self { handler: Handler::Async(callback) }
    }

    /// Identity used to find this listener again on removal.
    pub fn id(&self) -> ListenerId {
        match &self.handler {
            Handler::Plain(callback) => ListenerId::of(callback),
            Handler::Fallible(callback) => ListenerId::of(callback),
            Handler::Async(callback) => ListenerId::of(callback),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self.handler, Handler::Async(_))
    }

    /// Synchronously run the callback with an emitted payload.
    ///
    /// Asynchronous callbacks are invoked here and their future is handed to
    /// `tokio::spawn`; the result of that future is never observed. Outside a
    /// runtime the future is dropped unpolled.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use typed_events::{Callback, Listener};
    ///
    /// let callback: Callback<String> = Arc::new(|payload| assert_eq!(payload.as_str(), "hi"));
    /// let listener = Listener::new(callback);
    /// listener.call(&Arc::new("hi".to_string())).unwrap();
    /// ```
    pub fn call(&self, payload: &EventPayload<P>) -> Result<(), ListenerError> {
        match &self.handler {
            Handler::Plain(callback) => {
                callback(payload);
                Ok(())
            }
            Handler::Fallible(callback) => callback(payload),
            Handler::Async(callback) => {
                let task = callback(Arc::clone(payload));
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => {
                        runtime.spawn(task);
                    }
                    Err(_) => warn!("async listener emitted outside of a tokio runtime, dropping its future"),
                }
                Ok(())
            }
        }
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        let handler = match &self.handler {
            Handler::Plain(callback) => Handler::Plain(Arc::clone(callback)),
            Handler::Fallible(callback) => Handler::Fallible(Arc::clone(callback)),
            Handler::Async(callback) => Handler::Async(Arc::clone(callback)),
        };
        Self { handler }
    }
}

impl<P> Debug for Listener<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (kind, id) = match &self.handler {
            Handler::Plain(callback) => ("plain", ListenerId::of(callback)),
            Handler::Fallible(callback) => ("fallible", ListenerId::of(callback)),
            Handler::Async(callback) => ("async", ListenerId::of(callback)),
        };
        f.debug_struct("Listener")
            .field("kind", &kind)
            .field("id", &id)
            .finish()
    }
}

impl<P: Send + Sync + 'static> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl<P: Send + Sync + 'static> Eq for Listener<P> {}

impl<P: Send + Sync + 'static> From<Callback<P>> for Listener<P> {
    fn from(callback: Callback<P>) -> Self {
        Self::new(callback)
    }
}

/// Unregister function returned when a listener is added.
///
/// Removes exactly the registration it was created for. The first call removes it,
/// later calls do nothing. Clones share that state. Holds only a weak reference to the
/// emitter, so it never keeps listeners alive and becomes inert once the emitter is dropped.
#[derive(Clone)]
#[must_use = "dropping an Unsubscribe keeps the listener registered with no way to remove it"]
pub struct Unsubscribe {
    inner: Arc<Registration>,
}

struct Registration {
    registry: Weak<Registry>,
    event: TypeId,
    name: &'static str,
    listener: ListenerId,
    token: u64,
    active: AtomicBool,
}

impl Unsubscribe {
    pub(crate) fn new(
        registry: Weak<Registry>,
        event: TypeId,
        name: &'static str,
        listener: ListenerId,
        token: u64,
    ) -> Self {
        Self {
            inner: Arc::new(Registration {
                registry,
                event,
                name,
                listener,
                token,
                active: AtomicBool::new(true),
            }),
        }
    }

    /// Removes the listener from the event it was registered to.
    pub fn unsubscribe(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            if registry.remove_registration(self.inner.event, self.inner.token) {
                trace!(event = self.inner.name, "listener unsubscribed");
            }
        }
    }

    /// Whether [`unsubscribe`](Self::unsubscribe) has not been called yet.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn event_name(&self) -> &'static str {
        self.inner.name
    }

    pub fn listener_id(&self) -> ListenerId {
        self.inner.listener
    }
}

impl Debug for Unsubscribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event", &self.inner.name)
            .field("listener", &self.inner.listener)
            .field("active", &self.is_active())
            .finish()
    }
}
