//! Live event feed: committed journal entries pushed as Server-Sent Events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Extension,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::app::services::AppServices;

const HEARTBEAT: Duration = Duration::from_secs(15);

/// GET /stream
///
/// Each committed journal entry becomes one `event` message carrying the
/// entry as JSON. A `heartbeat` message goes out after 15 quiet seconds so a
/// closed client is noticed and the forwarding thread exits.
pub async fn stream_events(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let (tx, rx) = unbounded_channel::<Result<SseEvent, std::convert::Infallible>>();

    // The store's subscription blocks, so it is drained on a blocking thread.
    let subscription = services.store.subscribe();
    tokio::task::spawn_blocking(move || {
        let mut last_sent = Instant::now();
        loop {
            match subscription.recv_timeout(Duration::from_secs(1)) {
                Ok(entry) => {
                    let data = match serde_json::to_string(&entry) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!("skipping journal entry {}: {e}", entry.sequence_number());
                            continue;
                        }
                    };
                    let event = SseEvent::default()
                        .event("event")
                        .id(entry.sequence_number().to_string())
                        .data(data);
                    if tx.send(Ok(event)).is_err() {
                        break;
                    }
                    last_sent = Instant::now();
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    if last_sent.elapsed() > HEARTBEAT {
                        let heartbeat = SseEvent::default().event("heartbeat").data("{}");
                        if tx.send(Ok(heartbeat)).is_err() {
                            break;
                        }
                        last_sent = Instant::now();
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("event stream client disconnected");
    });

    Sse::new(UnboundedReceiverStream::new(rx))
        .keep_alive(KeepAlive::new().interval(HEARTBEAT))
        .into_response()
}
