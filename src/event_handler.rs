use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::oneshot;

use crate::{
    AsyncCallback, Callback, Event, EventError, EventPayload, FallibleCallback, Listener,
    Unsubscribe, WaitFor,
};

/// Defines the contract for types that manage typed event listeners and emit events.
///
/// `S` is the event alphabet: every method only accepts events whose [`Event::Set`] is `S`,
/// and every payload or callback must match that event's [`Event::Payload`].
///
/// All methods take `&self`, so listeners may add or remove listeners, or emit, while an
/// emission is running.
///
/// # Thread Safety
/// All implementors must be `Send + Sync`.
pub trait EventHandler<S>: Send + Sync {
    /// Gets the names of events that currently have one or more listeners, sorted.
    fn event_names(&self) -> Vec<&'static str>;

    /// Sets the listener count per event above which a warning is logged. `0` disables it.
    fn set_max_listeners(&self, max: usize);

    /// Gets the current listener warning threshold.
    fn max_listeners(&self) -> usize;

    /// Number of listeners registered to a specific event.
    fn listener_count<E: Event<Set = S>>(&self, event: E) -> usize;

    /// Number of listeners registered across all events.
    fn count_listeners(&self) -> usize;

    /// Whether a specific event has any registered listeners.
    fn has_listener<E: Event<Set = S>>(&self, event: E) -> bool {
        self.listener_count(event) > 0
    }

    /// Appends a listener to an event.
    ///
    /// A `limit` above zero makes the listener remove itself after that many invocations;
    /// `0` keeps it until removed.
    fn register<E: Event<Set = S>>(
        &self,
        event: E,
        listener: Listener<E::Payload>,
        limit: u64,
    ) -> Unsubscribe;

    /// Add a listener that stays registered until removed.
    fn add_listener<E: Event<Set = S>>(&self, event: E, callback: Callback<E::Payload>) -> Unsubscribe {
        self.register(event, Listener::new(callback), 0)
    }

    /// Add a listener whose `Err` stops the emission and is returned from `emit`.
    fn add_fallible_listener<E: Event<Set = S>>(
        &self,
        event: E,
        callback: FallibleCallback<E::Payload>,
    ) -> Unsubscribe {
        self.register(event, Listener::fallible(callback), 0)
    }

    /// Add a listener whose future is spawned on each emission and never awaited.
    fn add_async_listener<E: Event<Set = S>>(
        &self,
        event: E,
        callback: AsyncCallback<E::Payload>,
    ) -> Unsubscribe {
        self.register(event, Listener::asynchronous(callback), 0)
    }

    /// Add a listener limited to `limit` emissions.
    fn add_limited_listener<E: Event<Set = S>>(
        &self,
        event: E,
        limit: u64,
        callback: Callback<E::Payload>,
    ) -> Unsubscribe {
        self.register(event, Listener::new(callback), limit)
    }

    /// Add a listener for the next emission only.
    ///
    /// The registered listener is a wrapper, so passing `callback` to
    /// [`remove_listener`](Self::remove_listener) does not cancel it.
    fn once<E: Event<Set = S>>(&self, event: E, callback: Callback<E::Payload>) {
        let _ = self.register(event, Listener::new(callback), 1);
    }

    fn once_fallible<E: Event<Set = S>>(&self, event: E, callback: FallibleCallback<E::Payload>) {
        let _ = self.register(event, Listener::fallible(callback), 1);
    }

    fn once_async<E: Event<Set = S>>(&self, event: E, callback: AsyncCallback<E::Payload>) {
        let _ = self.register(event, Listener::asynchronous(callback), 1);
    }

    /// Wait for the next payload of an event.
    ///
    /// # Example
    /// ```
    /// use typed_events::{define_events, EventEmitter, EventHandler};
    ///
    /// define_events! {
    ///     Greetings {
    ///         Hello("hello") => String,
    ///     }
    /// }
    ///
    /// let emitter = EventEmitter::<Greetings>::new();
    /// let waiter = emitter.wait_for(Hello);
    /// emitter.emit(Hello, "world".to_string()).unwrap();
    ///
    /// let value = tokio_test::block_on(waiter);
    /// assert_eq!(value.as_str(), "world");
    /// assert_eq!(emitter.count_listeners(), 0);
    /// ```
    fn wait_for<E: Event<Set = S>>(&self, event: E) -> WaitFor<E::Payload> {
        let (sender, receiver) = oneshot::channel();
        let sender = Mutex::new(Some(sender));
        self.once(
            event,
            Arc::new(move |payload: &EventPayload<E::Payload>| {
                let sender = sender.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(sender) = sender {
                    let _ = sender.send(Arc::clone(payload));
                }
            }),
        );
        WaitFor::new(receiver)
    }

    /// Remove the first registration of `callback` for an event.
    ///
    /// `callback` must be the same `Arc` that was registered. Unknown events or callbacks
    /// are ignored.
    fn remove_listener<E: Event<Set = S>, C: ?Sized>(&self, event: E, callback: &Arc<C>);

    /// Remove all listeners of an event.
    fn remove_all_listeners<E: Event<Set = S>>(&self, event: E);

    /// Synchronously invoke every listener of an event, in registration order.
    fn emit<E: Event<Set = S>>(&self, event: E, payload: E::Payload) -> Result<(), EventError> {
        self.emit_shared(event, Arc::new(payload))
    }

    /// [`emit`](Self::emit) for a payload that is already shared.
    fn emit_shared<E: Event<Set = S>>(&self, event: E, payload: EventPayload<E::Payload>) -> Result<(), EventError>;
}
