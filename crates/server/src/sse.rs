use crate::errors::ApiError;
use axum::response::sse::{Event, Sse};
use futures::stream::{self, Stream};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tooling::ContentBlock;
use uuid::Uuid;

pub fn create_sse_stream(
    events: Vec<Event>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let stream = stream::iter(events.into_iter().map(Ok));
    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive-text"),
    )
}

/// Only argument names are echoed; values may carry credentials.
pub fn create_tool_usage_event(
    call_id: Uuid,
    tool_name: &str,
    argument_names: &[&str],
    duration_ms: u64,
) -> Event {
    let data = json!({
        "call_id": call_id,
        "tool": tool_name,
        "args": argument_names,
        "duration_ms": duration_ms
    });

    Event::default().event("tool_usage").data(data.to_string())
}

pub fn create_content_event(block: &ContentBlock) -> Event {
    Event::default().event("content").data(json!(block).to_string())
}

pub fn create_stream_end_event() -> Event {
    Event::default().event("stream_end").data("{}")
}

pub fn create_error_event(error: &ApiError) -> Event {
    let mut data = error.to_body();
    data["http_status"] = json!(error.http_status_code());

    Event::default().event("error_event").data(data.to_string())
}
