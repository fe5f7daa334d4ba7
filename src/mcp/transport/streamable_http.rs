//! Server-sent event framing for MCP responses.
//!
//! Streaming servers answer a POST with `data: <json>` frames. The reader
//! stops at the first frame that carries the JSON-RPC reply; it never drains
//! the remainder of the stream. Heartbeats, `event:` labels, interleaved
//! notifications, and the `[DONE]` sentinel are discarded.

use crate::mcp::client::protocol::JsonRpcResponse;
use crate::mcp::error::McpError;
use futures_util::StreamExt;
use tracing::debug;

/// Terminal sentinel some streaming servers emit after the result frame.
pub const SSE_DONE_SENTINEL: &str = "[DONE]";

/// Accumulates response bytes and yields complete, trimmed lines. Partial
/// lines stay buffered until the next chunk or [`SseLineBuffer::finish`].
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        self.drain_lines(false)
    }

    pub fn finish(&mut self) -> Vec<String> {
        self.drain_lines(true)
    }

    fn drain_lines(&mut self, flush: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut search_index = 0;

        while let Some(relative_pos) = self.buffer[search_index..].iter().position(|b| *b == b'\n')
        {
            let newline_index = search_index + relative_pos;
            let mut line_end = newline_index;
            if line_end > search_index && self.buffer[line_end - 1] == b'\r' {
                line_end -= 1;
            }

            if let Ok(text) = std::str::from_utf8(&self.buffer[search_index..line_end]) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }

            search_index = newline_index + 1;
        }

        if flush {
            if let Ok(text) = std::str::from_utf8(&self.buffer[search_index..]) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            self.buffer.clear();
        } else if search_index > 0 {
            self.buffer.drain(..search_index);
        }

        lines
    }
}

pub fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("text/event-stream"))
}

/// Extracts the payload of a `data:` frame line; anything else is not data.
pub fn sse_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Reads framed events until the first JSON-RPC reply frame and returns it.
pub async fn next_rpc_response(response: reqwest::Response) -> Result<JsonRpcResponse, McpError> {
    let mut stream = response.bytes_stream();
    let mut buffer = SseLineBuffer::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|err| McpError::Connection(format!("Event stream read failed: {err}")))?;
        for line in buffer.push(&chunk) {
            if let Some(reply) = decode_rpc_frame(&line) {
                return Ok(reply);
            }
        }
    }

    for line in buffer.finish() {
        if let Some(reply) = decode_rpc_frame(&line) {
            return Ok(reply);
        }
    }

    Err(McpError::Connection(
        "Event stream ended without a result frame.".to_string(),
    ))
}

/// Decodes one SSE line into a JSON-RPC reply, or `None` for everything that
/// is not one: heartbeats, `event:` labels, the `[DONE]` sentinel, frames
/// that do not decode, and interleaved notifications without result or error.
pub(crate) fn decode_rpc_frame(line: &str) -> Option<JsonRpcResponse> {
    let payload = sse_data_payload(line)?;
    if payload.is_empty() || payload == SSE_DONE_SENTINEL {
        return None;
    }
    match serde_json::from_str::<JsonRpcResponse>(payload) {
        Ok(frame) if frame.result.is_some() || frame.error.is_some() => Some(frame),
        Ok(_) => None,
        Err(err) => {
            debug!(%err, "Discarding undecodable event-stream frame");
            None
        }
    }
}
