use super::client::ByteStream;
use super::error::TransportError;
use crate::types::ProtocolEvent;
use crate::util::preview_text;
use encoding_rs::{CoderResult, Decoder, UTF_8};
use futures::{stream, Stream, StreamExt};
use std::collections::VecDeque;

pub const DATA_PREFIX: &str = "data: ";
const DROPPED_PREVIEW_CHARS: usize = 120;
/// Longest event line kept while waiting for its newline. A longer fragment
/// is dropped along with the rest of its line.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Incremental decoder for the `data: {json}\n` event stream.
///
/// Chunks may split lines and UTF-8 sequences anywhere. Only lines whose
/// terminating newline has been seen are parsed; the unterminated tail stays
/// pending until more bytes arrive or the stream ends, at which point it is
/// discarded.
pub struct StreamDecoder {
    utf8: Decoder,
    buffer: String,
    max_line_bytes: usize,
    skipping_oversized: bool,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_max_line_bytes(MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            utf8: UTF_8.new_decoder_without_bom_handling(),
            buffer: String::new(),
            max_line_bytes: max_line_bytes.max(1),
            skipping_oversized: false,
        }
    }

    pub fn process(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        self.decode_into_buffer(chunk, false);
        if self.skipping_oversized && !self.skip_oversized_remainder() {
            return Vec::new();
        }

        let events = self.drain_complete_lines();
        if self.buffer.len() > self.max_line_bytes {
            tracing::debug!(
                bytes = self.buffer.len(),
                limit = self.max_line_bytes,
                "dropping oversized event line"
            );
            self.buffer.clear();
            self.skipping_oversized = true;
        }
        events
    }

    /// Ends the stream and drops whatever unterminated text is still pending.
    ///
    /// Returns the number of bytes discarded so callers can log truncation.
    pub fn finish(&mut self) -> usize {
        self.decode_into_buffer(&[], true);
        let discarded = self.buffer.len();
        self.buffer.clear();
        self.skipping_oversized = false;
        self.utf8 = UTF_8.new_decoder_without_bom_handling();
        discarded
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn decode_into_buffer(&mut self, chunk: &[u8], last: bool) {
        let mut input = chunk;
        loop {
            let needed = self
                .utf8
                .max_utf8_buffer_length(input.len())
                .unwrap_or_else(|| input.len().saturating_mul(3).saturating_add(4));
            self.buffer.reserve(needed);

            let (result, read, had_errors) =
                self.utf8.decode_to_string(input, &mut self.buffer, last);
            if had_errors {
                tracing::debug!("invalid UTF-8 in event stream replaced with U+FFFD");
            }
            input = &input[read..];

            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    /// Discards text up to the newline ending an oversized line. Returns true
    /// once that newline has been seen.
    fn skip_oversized_remainder(&mut self) -> bool {
        match self.buffer.find('\n') {
            Some(newline) => {
                self.buffer.drain(..=newline);
                self.skipping_oversized = false;
                true
            }
            None => {
                self.buffer.clear();
                false
            }
        }
    }

    fn drain_complete_lines(&mut self) -> Vec<ProtocolEvent> {
        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let pending = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, pending);

        complete.lines().filter_map(parse_event_line).collect()
    }
}

fn parse_event_line(line: &str) -> Option<ProtocolEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<ProtocolEvent>(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::debug!(
                %error,
                data = %preview_text(payload, DROPPED_PREVIEW_CHARS),
                "dropping malformed event frame"
            );
            None
        }
    }
}

struct EventStreamState {
    bytes: Option<ByteStream>,
    decoder: StreamDecoder,
    ready: VecDeque<ProtocolEvent>,
}

/// Lazily decodes a transport byte stream into protocol events.
///
/// A transport error is yielded once and ends the sequence. Events decoded
/// before the error are still delivered first, in order.
pub fn decode_event_stream(
    bytes: ByteStream,
) -> impl Stream<Item = Result<ProtocolEvent, TransportError>> + Send {
    let state = EventStreamState {
        bytes: Some(bytes),
        decoder: StreamDecoder::new(),
        ready: VecDeque::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }

            let bytes = state.bytes.as_mut()?;
            match bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.process(&chunk);
                    state.ready.extend(events);
                }
                Some(Err(error)) => {
                    state.bytes = None;
                    return Some((Err(error), state));
                }
                None => {
                    state.bytes = None;
                    let discarded = state.decoder.finish();
                    if discarded > 0 {
                        tracing::debug!(
                            bytes = discarded,
                            "discarding unterminated trailing fragment at end of stream"
                        );
                    }
                }
            }
        }
    })
}
