//! Decoder for `data: <json>` event-stream lines.
//!
//! Malformed or unrelated lines are skipped, never treated as errors. The
//! stream ends at `data: [DONE]` or at end of input, whichever comes first.

use std::io;

use futures_util::TryStreamExt;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Meaning of a single event-stream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Nothing to emit: blank, non-data, malformed or content-free line.
    Skip,
    /// End-of-stream sentinel.
    Done,
    /// Non-empty `choices[0].delta.content`.
    Fragment(String),
}

/// Decode one line of a streaming chat completion response.
#[must_use]
pub fn decode_line(line: &str) -> SseLine {
    if line.trim().is_empty() {
        return SseLine::Skip;
    }
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return SseLine::Skip;
    };
    if data.trim() == DONE_SENTINEL {
        return SseLine::Done;
    }

    match serde_json::from_str::<Value>(data) {
        Ok(event) => match delta_content(&event) {
            Some(text) if !text.is_empty() => SseLine::Fragment(text.to_string()),
            _ => SseLine::Skip,
        },
        Err(e) => {
            tracing::warn!(error = %e, line = %data, "Skipping malformed stream event");
            SseLine::Skip
        }
    }
}

/// `choices[0].delta.content`, if every step of the path is present.
fn delta_content(event: &Value) -> Option<&str> {
    event
        .get("choices")?
        .as_array()?
        .first()?
        .get("delta")?
        .get("content")?
        .as_str()
}

/// Lazily decode content fragments from an event-stream body.
///
/// Reads one line at a time and stops at the sentinel without reading
/// further. A read error of kind `TimedOut` is yielded once and ends the
/// stream. Any other read error ends the stream the same way end of input
/// does.
pub fn fragments<R>(reader: R) -> impl futures_core::Stream<Item = io::Result<String>>
where
    R: AsyncBufRead + Unpin,
{
    futures_util::stream::unfold(Some(reader.split(b'\n')), |lines| async move {
        let mut lines = lines?;
        loop {
            let line = match lines.next_segment().await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => return None,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    tracing::warn!(error = %e, "Timed out reading event stream");
                    return Some((Err(e), None));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Event stream closed early");
                    return None;
                }
            };
            let line = String::from_utf8_lossy(&line);
            match decode_line(line.trim_end_matches('\r')) {
                SseLine::Skip => continue,
                SseLine::Done => return None,
                SseLine::Fragment(text) => return Some((Ok(text), Some(lines))),
            }
        }
    })
}

/// Drive [`fragments`] to completion and concatenate in arrival order.
///
/// # Errors
///
/// Returns the read error if the body timed out; no partial text is kept.
pub async fn collect_fragments<R>(reader: R) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    fragments(reader)
        .try_fold(String::new(), |mut text, fragment| async move {
            text.push_str(&fragment);
            Ok(text)
        })
        .await
}
