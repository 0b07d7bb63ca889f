//! Server-Sent Events support

use crate::game::SessionView;
use crate::router::OutboundReply;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Init { session: Option<SessionView> },
    Reply { text: String },
}

/// Convert one chat's reply broadcast into an SSE stream
pub fn sse_stream(
    chat_id: String,
    session: Option<SessionView>,
    broadcast_rx: broadcast::Receiver<OutboundReply>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move {
        Ok(stream_event_to_axum(StreamEvent::Init { session }))
    });

    let replies = BroadcastStream::new(broadcast_rx).filter_map(move |result| match result {
        Ok(reply) => Some(Ok(stream_event_to_axum(StreamEvent::Reply {
            text: reply.text,
        }))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(%chat_id, skipped, "SSE client fell behind, replies dropped");
            None
        }
    });

    let combined = init.chain(replies);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn stream_event_to_axum(event: StreamEvent) -> Event {
    let (event_type, data) = match event {
        StreamEvent::Init { session } => (
            "init",
            json!({
                "type": "init",
                "session": session
            }),
        ),
        StreamEvent::Reply { text } => (
            "reply",
            json!({
                "type": "reply",
                "text": text
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
