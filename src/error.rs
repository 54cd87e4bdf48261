use thiserror::Error;

/// Error type returned by fallible listeners.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the event system.
///
/// Removing unknown listeners and emitting to events nobody listens to are not errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventError {
    /// A fallible listener returned `Err` during emission.
    /// Listeners registered after it were not invoked.
    #[error("listener for event `{event}` failed: {source}")]
    Listener {
        event: &'static str,
        #[source]
        source: ListenerError,
    },
}

impl EventError {
    /// Name of the event whose emission failed.
    pub fn event(&self) -> &'static str {
        match self {
            EventError::Listener { event, .. } => event,
        }
    }
}
