use std::sync::Arc;

use futures::future::BoxFuture;

use crate::ListenerError;

/// Type alias for an event payload pointer.
///
/// Every listener of one emission shares the same `Arc<P>`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use typed_events::EventPayload;
///
/// let payload: EventPayload<String> = Arc::new(String::from("Emitting value"));
/// ```
pub type EventPayload<P> = Arc<P>;

/// Type alias for a plain callback pointer.
///
/// - Requires `Send + Sync` so the emitter can be shared between threads.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use typed_events::{Callback, EventPayload};
///
/// let callback: Callback<String> = Arc::new(move |payload: &EventPayload<String>| {
///     println!("Received event: {}", payload);
/// });
/// ```
pub type Callback<P> = Arc<dyn Fn(&EventPayload<P>) + Send + Sync>;

/// Type alias for a callback that may fail.
///
/// An `Err` stops the emission in progress and is handed back to the caller of `emit`.
pub type FallibleCallback<P> =
    Arc<dyn Fn(&EventPayload<P>) -> Result<(), ListenerError> + Send + Sync>;

/// Type alias for an asynchronous callback.
///
/// The returned future is spawned onto the current tokio runtime and never awaited by the emitter.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use futures::FutureExt;
/// use typed_events::{AsyncCallback, EventPayload};
///
/// let callback: AsyncCallback<u32> = Arc::new(|payload: EventPayload<u32>| {
///     async move {
///         let _reading = *payload;
///     }
///     .boxed()
/// });
/// ```
pub type AsyncCallback<P> = Arc<dyn Fn(EventPayload<P>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Default warning threshold for listeners registered to a single event.
pub const DEFAULT_MAX_LISTENERS: usize = 10;
