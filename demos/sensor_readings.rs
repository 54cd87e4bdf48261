//! Example: waiting for sensor readings on a tokio runtime
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use typed_events::{define_events, EventEmitter, EventHandler};

define_events! {
    pub Sensors {
        Temperature("temperature") => f32,
        Triggered("sensor_triggered") => u32,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let emitter = EventEmitter::<Sensors>::default();

    // Slow work happens off the emitting thread
    let _archive = emitter.add_async_listener(
        Temperature,
        Arc::new(|reading| {
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                println!("archived {reading:.1}°C");
            }
            .boxed()
        }),
    );
    let _alarm = emitter.add_fallible_listener(
        Temperature,
        Arc::new(|reading| match **reading {
            value if value > 90.0 => Err(format!("overheating at {value}°C").into()),
            _ => Ok(()),
        }),
    );

    let next_trigger = emitter.wait_for(Triggered);
    let producer = emitter.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _ = producer.emit(Triggered, 42);
    });

    let sensor = tokio::time::timeout(Duration::from_secs(1), next_trigger).await?;
    println!("sensor {sensor} triggered");

    emitter.emit(Temperature, 21.5)?;
    if let Err(err) = emitter.emit(Temperature, 95.0) {
        println!("alarm: {err}");
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
