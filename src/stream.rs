//! Translation of the vendor event stream into the newline-delimited frame
//! protocol the browser chat runtime consumes (Vercel AI SDK data stream, v1).
//!
//! Wire format, one frame per line:
//!   `0:{"id":"<msg id>","role":"assistant","content":"<delta>"}` — text delta
//!   `d:{"finishReason":"<reason>"}`                              — terminal frame
//!
//! The tag and payload shapes are an external contract pinned to the browser
//! runtime; they are not free to change independently of it.

use async_stream::try_stream;
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::anthropic::EventStream;
use crate::errors::AppError;

/// Marker header identifying the framing protocol version on success
/// responses.
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
pub const DATA_STREAM_VERSION: &str = "v1";

#[derive(Debug, Serialize)]
struct TextFrame<'a> {
    id: &'a str,
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct DoneFrame<'a> {
    #[serde(rename = "finishReason")]
    finish_reason: &'a str,
}

fn text_frame(id: &str, delta: &str) -> Result<String, AppError> {
    let payload = serde_json::to_string(&TextFrame { id, role: "assistant", content: delta })
        .map_err(|e| AppError::stream(format!("failed to encode text frame: {e}")))?;
    Ok(format!("0:{payload}\n"))
}

fn done_frame(reason: &str) -> Result<String, AppError> {
    let payload = serde_json::to_string(&DoneFrame { finish_reason: reason })
        .map_err(|e| AppError::stream(format!("failed to encode done frame: {e}")))?;
    Ok(format!("d:{payload}\n"))
}

/// Maps the vendor stop-reason vocabulary onto the finish reasons the browser
/// runtime understands. Unrecognized reasons pass through unchanged.
pub fn map_stop_reason(reason: &str) -> &str {
    match reason {
        "end_turn" | "stop_sequence" => "stop",
        "max_tokens" => "length",
        "tool_use" => "tool-calls",
        "refusal" => "content-filter",
        other => other,
    }
}

/// Adapts the upstream event stream into outbound frames.
///
/// Single-pass stateful fold: text deltas are re-emitted one frame each,
/// `message_delta`/`message_stop` collapse into at most one done frame, and
/// any upstream error aborts the stream. Unknown event types are a no-op.
pub fn encode_data_stream(
    mut upstream: EventStream,
) -> impl Stream<Item = Result<String, AppError>> + Send {
    try_stream! {
        // Correlation id for text frames; replaced by the vendor-issued id
        // when the message_start event arrives.
        let mut message_id = format!("msg_{}", Utc::now().timestamp_millis());
        let mut reply = String::new();
        let mut text_emitted = false;
        let mut done_emitted = false;

        while let Some(event) = upstream.next().await {
            let event = event?;
            match event.kind.as_str() {
                "message_start" => {
                    if let Some(id) = event.message.and_then(|m| m.id) {
                        message_id = id;
                    }
                }
                "content_block_delta" => {
                    let delta = match event.delta {
                        Some(delta) => delta,
                        None => {
                            warn!("content_block_delta without delta payload");
                            continue;
                        }
                    };
                    if delta.kind.as_deref() == Some("text_delta") {
                        if let Some(text) = delta.text {
                            reply.push_str(&text);
                            text_emitted = true;
                            yield text_frame(&message_id, &text)?;
                        }
                    }
                }
                "message_delta" => {
                    if !done_emitted {
                        if let Some(reason) = event.delta.and_then(|d| d.stop_reason) {
                            done_emitted = true;
                            yield done_frame(map_stop_reason(&reason))?;
                        }
                    }
                }
                "message_stop" => {
                    if text_emitted && !done_emitted {
                        done_emitted = true;
                        yield done_frame("stop")?;
                    }
                    debug!(id = %message_id, chars = reply.len(), "assistant turn complete");
                    break;
                }
                "error" => {
                    let message = event
                        .error
                        .map(|e| format!("{}: {}", e.kind, e.message))
                        .unwrap_or_else(|| "unspecified upstream error".to_string());
                    Err::<(), AppError>(AppError::stream(message))?;
                }
                // Forward-compatible no-op: ping, content_block_start/stop, etc.
                _ => {}
            }
        }
    }
}
