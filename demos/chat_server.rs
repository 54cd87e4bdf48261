//! Example: chat room server events, threaded (std)
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use typed_events::{define_events, EventEmitter, EventError, EventHandler};

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub from: String,
    pub text: String,
}

define_events! {
    /// Everything a chat room announces.
    pub ChatEvents {
        ClientConnected("client_connected") => String,
        MessageReceived("message_received") => ChatMessage,
        ClientLeft("client_left") => String,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let emitter = EventEmitter::<ChatEvents>::default();

    let _connected = emitter.add_listener(
        ClientConnected,
        Arc::new(|name| println!("Client connected: {name}")),
    );
    let log_messages = emitter.add_listener(
        MessageReceived,
        Arc::new(|message| println!("{}: {}", message.from, message.text)),
    );
    emitter.once(
        ClientLeft,
        Arc::new(|name| println!("First to leave: {name}")),
    );

    std::thread::scope(|scope| {
        let clients: Vec<_> = ["Alice", "Bob"]
            .into_iter()
            .map(|name| {
                let emitter = emitter.clone();
                scope.spawn(move || -> Result<(), EventError> {
                    emitter.emit(ClientConnected, name.to_string())?;
                    emitter.emit(
                        MessageReceived,
                        ChatMessage { from: name.to_string(), text: format!("Hello from {name}") },
                    )
                })
            })
            .collect();
        clients
            .into_iter()
            .try_for_each(|client| client.join().expect("client thread panicked"))
    })?;

    log_messages.unsubscribe();
    emitter.emit(
        MessageReceived,
        ChatMessage { from: "Alice".to_string(), text: "nobody hears this".to_string() },
    )?;
    emitter.emit(ClientLeft, "Bob".to_string())?;
    emitter.emit(ClientLeft, "Alice".to_string())?;

    println!("Active events: {:?}", emitter.event_names());
    Ok(())
}
