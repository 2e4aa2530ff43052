//! Server-sent events endpoints
//!
//! GET streams broadcast messages as SSE frames with a heartbeat; POST
//! publishes a message to every open stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;

use crate::server::{AppState, BroadcastMessage};

/// Open an event stream
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.sse.subscribe();

    let greeting = stream::once(async {
        Ok::<_, Infallible>(
            Event::default()
                .event("message")
                .data(json!({ "text": "SSE connection established!" }).to_string()),
        )
    });

    let broadcasts = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    let event = Event::default()
                        .event(message.event)
                        .data(message.data.to_string());
                    return Some((Ok::<_, Infallible>(event), receiver));
                }
                // Skipped messages are acceptable for a notification feed
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(greeting.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("ping"),
    )
}

/// Publish a message to all open streams
pub async fn publish(
    State(state): State<AppState>,
    Json(message): Json<BroadcastMessage>,
) -> Json<Value> {
    let delivered = state.sse.publish(message);
    Json(json!({ "ok": true, "delivered": delivered }))
}
