//! # Typed Events
//!
//! A type-safe event emitter. Callers declare a fixed alphabet of events, each bound
//! to one payload type, and the compiler checks every `emit`, listener and `wait_for`
//! against that binding.
//!
//! - **Event**: Marker trait binding an event name to its payload type, usually declared with [`define_events!`].
//! - **Listener**: Represents a callback that can be registered to an event.
//! - **EventEmitter**: Manages listener registration and synchronous emission.
//! - **EventHandler**: Trait defining the event API.
//!
//! ```
//! use std::sync::Arc;
//! use typed_events::{define_events, EventEmitter, EventHandler};
//!
//! define_events! {
//!     pub AppEvents {
//!         Str("str") => String,
//!         Num("num") => f64,
//!     }
//! }
//!
//! let emitter = EventEmitter::<AppEvents>::new();
//! emitter.once(Str, Arc::new(|value| {
//!     // `value` is known to be a string
//!     assert_eq!(value.len(), 26);
//! }));
//! emitter.emit(Str, "this can only send strings".to_string()).unwrap();
//! emitter.emit(Num, 4.2).unwrap();
//! ```

mod config;
mod constants;
mod error;
mod event;
mod event_emitter;
mod event_handler;
mod listener;
mod wait_for;

pub use config::EmitterConfig;
pub use constants::{AsyncCallback, Callback, EventPayload, FallibleCallback, DEFAULT_MAX_LISTENERS};
pub use error::{EventError, ListenerError};
pub use event::Event;
pub use event_emitter::EventEmitter;
pub use event_handler::EventHandler;
pub use listener::{Listener, ListenerId, Unsubscribe};
pub use wait_for::WaitFor;

#[cfg(test)]
mod tests;
