/// Binds an event name to the payload type it carries.
///
/// Implementors are zero-sized marker types. The marker value is passed wherever an
/// event name is expected, and the compiler checks every payload and callback against
/// [`Event::Payload`]. [`Event::Set`] ties the marker to the alphabet of one emitter, so an
/// `EventEmitter<ChatEvents>` only accepts events declared for `ChatEvents`.
///
/// Most code declares events with [`define_events!`](crate::define_events) rather than
/// implementing this trait by hand.
///
/// # Example
/// ```
/// use typed_events::Event;
///
/// pub enum Sensors {}
///
/// #[derive(Debug, Clone, Copy)]
/// pub struct Temperature;
///
/// impl Event for Temperature {
///     type Set = Sensors;
///     type Payload = f32;
///     const NAME: &'static str = "temperature";
/// }
/// ```
pub trait Event: Copy + Send + Sync + 'static {
    /// The alphabet this event belongs to.
    type Set: 'static;

    /// The value carried by every emission of this event.
    type Payload: Send + Sync + 'static;

    /// Human readable name, used in logs, errors and [`event_names`](crate::EventHandler::event_names).
    const NAME: &'static str;
}

/// Declares an event alphabet: one uninhabited set type plus one marker type per event.
///
/// Event names default to the marker's identifier; a string literal in parentheses
/// overrides it.
///
/// # Example
/// ```
/// use typed_events::{define_events, Event};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct User {
///     pub name: String,
///     pub age: u8,
/// }
///
/// define_events! {
///     /// Everything the chat room can announce.
///     pub ChatEvents {
///         Hello("hello") => String,
///         World => u32,
///         /// A user joined.
///         Joined => User,
///     }
/// }
///
/// assert_eq!(Hello::NAME, "hello");
/// assert_eq!(World::NAME, "World");
/// ```
#[macro_export]
macro_rules! define_events {
    (@name $name:ident) => {
        stringify!($name)
    };
    (@name $name:ident $label:literal) => {
        $label
    };
    (
        $(#[$set_meta:meta])*
        $vis:vis $set:ident {
            $(
                $(#[$meta:meta])*
                $name:ident $(($label:literal))? => $payload:ty
            ),* $(,)?
        }
    ) => {
        $(#[$set_meta])*
        #[derive(Debug)]
        $vis enum $set {}

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            $vis struct $name;

            impl $crate::Event for $name {
                type Set = $set;
                type Payload = $payload;
                const NAME: &'static str = $crate::define_events!(@name $name $($label)?);
            }
        )*
    };
}
