//! Server-sent-event decoding for OpenAI-compatible chat streams.
//!
//! Each `data:` line carries one JSON chunk; `data: [DONE]` ends the stream.
//! Lines are split on raw bytes so multi-byte characters that straddle
//! network chunks are reassembled before decoding.

use async_stream::try_stream;
use futures::StreamExt;
use serde::Deserialize;
use techtweet_http::ByteStream;

use crate::traits::{LlmError, TextStream};

const DONE: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: String,
}

/// What one SSE line means for the fragment stream.
#[derive(Debug, PartialEq)]
enum Line {
    Fragment(String),
    Done,
    Skip,
}

fn decode_line(raw: &[u8]) -> Result<Line, LlmError> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| LlmError::Stream(format!("invalid utf-8 in stream: {e}")))?
        .trim_end_matches('\r');

    let Some(payload) = line.strip_prefix("data:") else {
        // blank separators, `event:`/`id:` fields and `:` comments
        return Ok(Line::Skip);
    };
    let payload = payload.trim();
    if payload == DONE {
        return Ok(Line::Done);
    }
    if payload.is_empty() {
        return Ok(Line::Skip);
    }

    let chunk: Chunk = serde_json::from_str(payload)
        .map_err(|e| LlmError::Stream(format!("undecodable chunk: {e}")))?;
    if let Some(err) = chunk.error {
        return Err(LlmError::Api(err.message));
    }
    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();
    if content.is_empty() {
        Ok(Line::Skip)
    } else {
        Ok(Line::Fragment(content))
    }
}

/// Turn a raw SSE body into a stream of content fragments.
///
/// The stream fails if the body ends before `[DONE]`.
pub fn decode_stream(mut body: ByteStream) -> TextStream {
    Box::pin(try_stream! {
        let mut buf: Vec<u8> = Vec::new();
        let mut done = false;

        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(LlmError::Http)?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                match decode_line(&line[..line.len() - 1])? {
                    Line::Fragment(text) => yield text,
                    Line::Done => {
                        done = true;
                        break 'read;
                    }
                    Line::Skip => {}
                }
            }
        }

        if !done && !buf.is_empty() {
            // final line without a trailing newline
            match decode_line(&buf)? {
                Line::Fragment(text) => yield text,
                Line::Done => done = true,
                Line::Skip => {}
            }
        }

        if !done {
            tracing::warn!("llm.stream.truncated");
            Err::<(), _>(LlmError::Stream("stream ended before [DONE]".to_string()))?;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::collect_text;
    use bytes::Bytes;
    use futures::stream;
    use techtweet_http::HttpError;

    fn body(parts: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, HttpError>(Bytes::from_static(p))),
        ))
    }

    #[test]
    fn missing_content_is_skipped() {
        let line = br#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(decode_line(line).unwrap(), Line::Skip);
    }

    #[test]
    fn comments_and_events_are_skipped() {
        assert_eq!(decode_line(b": keep-alive").unwrap(), Line::Skip);
        assert_eq!(decode_line(b"event: message").unwrap(), Line::Skip);
        assert_eq!(decode_line(b"data: [DONE]\r").unwrap(), Line::Done);
    }

    #[test]
    fn in_stream_error_object_fails() {
        let line = br#"data: {"error":{"message":"model overloaded"}}"#;
        assert!(matches!(decode_line(line), Err(LlmError::Api(m)) if m == "model overloaded"));
    }

    #[tokio::test]
    async fn reassembles_lines_split_across_chunks() {
        let s = decode_stream(body(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel".as_slice(),
            b"lo\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" \xc3".as_slice(),
            b"\xa9t\xc3\xa9\"}}]}\n\ndata: [DONE]\n\n".as_slice(),
        ]));
        assert_eq!(collect_text(s).await.unwrap(), "Hello été");
    }

    #[tokio::test]
    async fn eof_before_done_is_an_error() {
        let s = decode_stream(body(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"cut\"}}]}\n\n".as_slice(),
        ]));
        assert!(matches!(collect_text(s).await, Err(LlmError::Stream(_))));
    }

    #[tokio::test]
    async fn done_without_trailing_newline_is_accepted() {
        let s = decode_stream(body(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n".as_slice(),
            b"data: [DONE]".as_slice(),
        ]));
        assert_eq!(collect_text(s).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn garbage_chunk_fails() {
        let s = decode_stream(body(vec![b"data: {not json}\n\ndata: [DONE]\n".as_slice()]));
        assert!(matches!(collect_text(s).await, Err(LlmError::Stream(_))));
    }
}
