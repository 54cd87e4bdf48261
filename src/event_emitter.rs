use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::{
    EmitterConfig, Event, EventError, EventHandler, EventPayload, FallibleCallback, Listener,
    ListenerId, Unsubscribe,
};

/// A type-erased listener slot. `listener` always holds a `Listener<P>` for the payload
/// type of the event it is stored under.
#[derive(Clone)]
struct StoredListener {
    id: ListenerId,
    /// Unique per registration, unlike `id` which repeats when a callback is added twice
    /// and can be reused by the allocator once the callback is dropped.
    token: u64,
    listener: Arc<dyn Any + Send + Sync>,
}

impl StoredListener {
    fn new<P: Send + Sync + 'static>(listener: Listener<P>, token: u64) -> Self {
        Self { id: listener.id(), token, listener: Arc::new(listener) }
    }

    fn downcast<P: Send + Sync + 'static>(&self) -> Option<&Listener<P>> {
        self.listener.downcast_ref::<Listener<P>>()
    }
}

struct Slot {
    name: &'static str,
    listeners: Vec<StoredListener>,
    warned: bool,
}

impl Slot {
    fn new(name: &'static str) -> Self {
        Self { name, listeners: Vec::new(), warned: false }
    }
}

/// Shared state behind every clone of an [`EventEmitter`].
pub(crate) struct Registry {
    /// Listeners per event marker type. An event without listeners has no entry.
    events: DashMap<TypeId, Slot>,
    max_listeners: AtomicUsize,
    next_token: AtomicU64,
}

impl Registry {
    /// Removes the first listener with identity `id`. Returns whether one was found.
    pub(crate) fn remove(&self, event: TypeId, id: ListenerId) -> bool {
        self.remove_first(event, |stored| stored.id == id)
    }

    /// Removes the registration created with `token`, if it is still present.
    pub(crate) fn remove_registration(&self, event: TypeId, token: u64) -> bool {
        self.remove_first(event, |stored| stored.token == token)
    }

    fn remove_first(&self, event: TypeId, matches: impl Fn(&StoredListener) -> bool) -> bool {
        let removed = match self.events.get_mut(&event) {
            Some(mut slot) => {
                let position = slot.listeners.iter().position(|stored| matches(stored));
                match position {
                    Some(index) => {
                        slot.listeners.remove(index);
                        true
                    }
                    None => false,
                }
            }
            None => false,
        };
        if removed {
            self.events.remove_if(&event, |_, slot| slot.listeners.is_empty());
        }
        removed
    }
}

/// A type-safe event emitter.
///
/// `S` is the event alphabet declared with [`define_events!`](crate::define_events).
/// Each event is bound to one payload type, and the compiler rejects emitting or
/// listening with any other.
///
/// Listeners run synchronously on the emitting thread, in registration order. Each
/// emission works on a snapshot of the listener list, so listeners added or removed
/// while it runs only affect later emissions.
///
/// Cloning an `EventEmitter` yields another handle to the same listeners. They are
/// released when the last handle is dropped. A listener that captures a clone of its own
/// emitter keeps the registry alive until that listener is removed.
///
/// # Implementation Notes
/// - Uses `DashMap` for concurrent event storage; no lock is held while a listener runs.
/// - All listeners for an event are stored in a `Vec` keyed by the event's marker type.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use typed_events::{define_events, EventEmitter, EventHandler};
///
/// define_events! {
///     pub Room {
///         Message("message") => String,
///         Occupancy("occupancy") => u32,
///     }
/// }
///
/// let emitter = EventEmitter::<Room>::new();
/// let unsubscribe = emitter.add_listener(Message, Arc::new(|text| {
///     assert_eq!(text.as_str(), "this can only send strings");
/// }));
///
/// emitter.emit(Message, "this can only send strings".to_string()).unwrap();
/// // emitter.emit(Occupancy, "nope".to_string()); // does not compile: expects u32
///
/// unsubscribe.unsubscribe();
/// assert_eq!(emitter.listener_count(Message), 0);
/// ```
pub struct EventEmitter<S> {
    registry: Arc<Registry>,
    _events: PhantomData<fn() -> S>,
}

impl<S> EventEmitter<S> {
    /// Creates an empty emitter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Creates an empty emitter from an [`EmitterConfig`].
    ///
    /// # Example
    /// ```
    /// use typed_events::{define_events, EmitterConfig, EventEmitter, EventHandler};
    ///
    /// define_events! { Ticks { Tick => u64 } }
    ///
    /// let emitter = EventEmitter::<Ticks>::with_config(EmitterConfig::default().with_max_listeners(20));
    /// assert_eq!(emitter.max_listeners(), 20);
    /// ```
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            registry: Arc::new(Registry {
                events: DashMap::new(),
                max_listeners: AtomicUsize::new(config.max_listeners),
                next_token: AtomicU64::new(0),
            }),
            _events: PhantomData,
        }
    }

    /// The configuration currently in effect.
    pub fn config(&self) -> EmitterConfig {
        EmitterConfig {
            max_listeners: self.registry.max_listeners.load(Ordering::Relaxed),
        }
    }

    /// Appends `listener` without any lifetime wrapper and warns once per event when the
    /// listener count passes the configured threshold.
    fn insert<E: Event<Set = S>>(&self, listener: Listener<E::Payload>) -> Unsubscribe {
        let id = listener.id();
        let token = self.registry.next_token.fetch_add(1, Ordering::Relaxed);
        let max = self.registry.max_listeners.load(Ordering::Relaxed);
        let (count, overloaded) = {
            let mut slot = self
                .registry
                .events
                .entry(TypeId::of::<E>())
                .or_insert_with(|| Slot::new(E::NAME));
            slot.listeners.push(StoredListener::new(listener, token));
            let count = slot.listeners.len();
            let overloaded = max > 0 && count > max && !slot.warned;
            if overloaded {
                slot.warned = true;
            }
            (count, overloaded)
        };
        if overloaded {
            warn!(
                event = E::NAME,
                listeners = count,
                max_listeners = max,
                "possible listener leak: more listeners than max_listeners registered for one event"
            );
        }
        trace!(event = E::NAME, listeners = count, "listener added");
        Unsubscribe::new(Arc::downgrade(&self.registry), TypeId::of::<E>(), E::NAME, id, token)
    }

    /// Wraps `listener` so it fires at most `limit` times, retiring itself before its
    /// last invocation.
    fn insert_limited<E: Event<Set = S>>(&self, listener: Listener<E::Payload>, limit: u64) -> Unsubscribe {
        let remaining = Arc::new(AtomicU64::new(limit));
        let handle: Arc<OnceLock<Unsubscribe>> = Arc::new(OnceLock::new());

        let wrapper: FallibleCallback<E::Payload> = Arc::new({
            let remaining = Arc::clone(&remaining);
            let handle = Arc::clone(&handle);
            move |payload: &EventPayload<E::Payload>| {
                let claimed = remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
                match claimed {
                    Err(_) => return Ok(()),
                    Ok(1) => {
                        if let Some(unsubscribe) = handle.get() {
                            unsubscribe.unsubscribe();
                        }
                        debug!(event = E::NAME, "limited listener reached its limit");
                    }
                    Ok(_) => {}
                }
                listener.call(payload)
            }
        });

        let unsubscribe = self.insert::<E>(Listener::fallible(wrapper));
        let _ = handle.set(unsubscribe.clone());
        // Another thread may have used up the last call before the handle was set.
        if remaining.load(Ordering::SeqCst) == 0 {
            unsubscribe.unsubscribe();
        }
        unsubscribe
    }
}

impl<S> EventHandler<S> for EventEmitter<S> {
    /// Returns the names of all events that currently have one or more listeners.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use typed_events::{define_events, EventEmitter, EventHandler};
    ///
    /// define_events! { Pair { One("event_one") => (), Two("event_two") => () } }
    ///
    /// let emitter = EventEmitter::<Pair>::new();
    /// let _one = emitter.add_listener(One, Arc::new(|_| {}));
    /// let _two = emitter.add_listener(Two, Arc::new(|_| {}));
    /// assert_eq!(emitter.event_names(), vec!["event_one", "event_two"]);
    /// ```
    fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .registry
            .events
            .iter()
            .filter(|entry| !entry.value().listeners.is_empty())
            .map(|entry| entry.value().name)
            .collect();
        names.sort_unstable();
        names
    }

    fn set_max_listeners(&self, max: usize) {
        self.registry.max_listeners.store(max, Ordering::Relaxed);
    }

    fn max_listeners(&self) -> usize {
        self.registry.max_listeners.load(Ordering::Relaxed)
    }

    fn listener_count<E: Event<Set = S>>(&self, _event: E) -> usize {
        self.registry
            .events
            .get(&TypeId::of::<E>())
            .map(|slot| slot.listeners.len())
            .unwrap_or(0)
    }

    fn count_listeners(&self) -> usize {
        self.registry
            .events
            .iter()
            .map(|entry| entry.value().listeners.len())
            .sum()
    }

    fn register<E: Event<Set = S>>(
        &self,
        _event: E,
        listener: Listener<E::Payload>,
        limit: u64,
    ) -> Unsubscribe {
        match limit {
            0 => self.insert::<E>(listener),
            limit => self.insert_limited::<E>(listener, limit),
        }
    }

    fn remove_listener<E: Event<Set = S>, C: ?Sized>(&self, _event: E, callback: &Arc<C>) {
        if self.registry.remove(TypeId::of::<E>(), ListenerId::of(callback)) {
            trace!(event = E::NAME, "listener removed");
        }
    }

    fn remove_all_listeners<E: Event<Set = S>>(&self, _event: E) {
        if let Some((_, slot)) = self.registry.events.remove(&TypeId::of::<E>()) {
            trace!(event = E::NAME, removed = slot.listeners.len(), "all listeners removed");
        }
    }

    /// Invokes every listener registered when the call starts, in order, with `payload`.
    ///
    /// # Returns
    /// * `Ok(())` once every listener has been invoked, including when there are none.
    /// * `Err(EventError::Listener)` from the first fallible listener that failed; the
    ///   listeners after it are skipped.
    ///
    /// Panics raised by a listener propagate to the caller.
    fn emit_shared<E: Event<Set = S>>(&self, _event: E, payload: EventPayload<E::Payload>) -> Result<(), EventError> {
        // Clone the slot so the shard lock is released before any listener runs.
        let snapshot: Vec<StoredListener> = match self.registry.events.get(&TypeId::of::<E>()) {
            Some(slot) => slot.listeners.clone(),
            None => Vec::new(),
        };
        trace!(event = E::NAME, listeners = snapshot.len(), "emitting event");

        for stored in &snapshot {
            let Some(listener) = stored.downcast::<E::Payload>() else {
                warn!(event = E::NAME, listener = ?stored.id, "skipping listener with mismatched payload type");
                continue;
            };
            listener
                .call(&payload)
                .map_err(|source| EventError::Listener { event: E::NAME, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl<S> EventEmitter<S> {
    /// Stores `listener` under `E` even though its payload type differs from `E::Payload`.
    pub(crate) fn insert_mismatched<E: Event<Set = S>, P: Send + Sync + 'static>(&self, listener: Listener<P>) {
        let token = self.registry.next_token.fetch_add(1, Ordering::Relaxed);
        self.registry
            .events
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Slot::new(E::NAME))
            .listeners
            .push(StoredListener::new(listener, token));
    }
}

impl<S> Clone for EventEmitter<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            _events: PhantomData,
        }
    }
}

impl<S> Default for EventEmitter<S> {
    /// Creates an empty emitter with a max listeners threshold of 10.
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Debug for EventEmitter<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.registry.events.len())
            .field("max_listeners", &self.registry.max_listeners.load(Ordering::Relaxed))
            .finish()
    }
}
