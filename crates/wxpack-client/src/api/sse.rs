//! SSE decoding for the progress stream
//!
//! Reassembles `data:` lines from raw body chunks and parses each payload
//! into a [`ProgressEvent`]. Malformed payloads are dropped as noise and
//! never reach the caller.

use bytes::Bytes;
use tracing::debug;

use super::types::ProgressEvent;

/// Incremental decoder over the raw SSE byte stream
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    /// Accumulated partial line from previous chunks
    partial_line: String,
    /// Messages seen so far, for logging
    event_count: usize,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, returning every event it completes
    pub(crate) fn push_chunk(&mut self, bytes: &Bytes) -> Vec<ProgressEvent> {
        let text = String::from_utf8_lossy(bytes);
        let combined = format!("{}{}", self.partial_line, text);
        let lines: Vec<&str> = combined.lines().collect();

        // Hold back an unterminated trailing line for the next chunk
        if !combined.ends_with('\n') && !lines.is_empty() {
            self.partial_line = lines.last().copied().unwrap_or("").to_string();
        } else {
            self.partial_line.clear();
        }

        let complete_lines = if self.partial_line.is_empty() {
            lines.len()
        } else {
            lines.len() - 1
        };

        let mut events = Vec::new();
        for line in lines.iter().take(complete_lines) {
            // Skip blank separators and SSE comments
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data: ") {
                if let Some(event) = self.decode_data(data) {
                    events.push(event);
                }
            }
        }
        events
    }

    fn decode_data(&mut self, data: &str) -> Option<ProgressEvent> {
        self.event_count += 1;
        match serde_json::from_str::<ProgressEvent>(data) {
            Ok(event) => {
                debug!(
                    "progress stream message #{}: {:?}",
                    self.event_count, event.kind
                );
                Some(event)
            }
            Err(err) => {
                debug!(
                    "dropping malformed progress message #{}: {}",
                    self.event_count, err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ProgressEventKind;

    fn chunk(text: &str) -> Bytes {
        Bytes::copy_from_slice(text.as_bytes())
    }

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(&chunk(
            "data: {\"type\":\"progress\",\"stage\":\"decrypt\",\"percent\":40,\"message\":\"decrypting\"}\n\n",
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, "decrypt");
        assert_eq!(events[0].percent, 40.0);
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(&chunk(
            "data: {\"type\":\"progress\",\"stage\":\"decrypt\",\"percent\":10,\"message\":\"a\"}\n\n\
             data: {\"type\":\"progress\",\"stage\":\"unpack\",\"percent\":60,\"message\":\"b\"}\n\n",
        ));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].stage, "unpack");
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let first = decoder.push_chunk(&chunk("data: {\"type\":\"progress\",\"sta"));
        assert!(first.is_empty());
        let second =
            decoder.push_chunk(&chunk("ge\":\"unpack\",\"percent\":75,\"message\":\"c\"}\n\n"));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].stage, "unpack");
        assert_eq!(second[0].percent, 75.0);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(&chunk(
            ": keep-alive\n\ndata: {\"type\":\"complete\",\"stage\":\"completed\",\"percent\":100,\"message\":\"done\"}\n\n",
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProgressEventKind::Complete);
    }

    #[test]
    fn test_malformed_payload_dropped() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(&chunk(
            "data: {not json}\n\n\
             data: {\"type\":\"progress\",\"stage\":\"decrypt\",\"percent\":5,\"message\":\"d\"}\n\n",
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].percent, 5.0);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(&chunk("event: custom\nid: 7\nretry: 5000\n\n"));
        assert!(events.is_empty());
    }
}
