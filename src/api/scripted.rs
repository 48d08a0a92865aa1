use super::client::ByteStream;
use super::error::TransportError;
use super::Transport;
use crate::request::GenerateRequest;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream;
use std::sync::{Arc, Mutex};

/// One scripted response: either a byte stream delivered chunk by chunk or an
/// up-front rejection.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Chunks(Vec<Vec<u8>>),
    Rejected { status: u16, message: Option<String> },
    /// Delivers the chunks, then fails the read instead of ending cleanly.
    Interrupted(Vec<Vec<u8>>),
}

impl ScriptedResponse {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedResponse::Chunks(
            lines
                .into_iter()
                .map(|line| line.into().into_bytes())
                .collect(),
        )
    }

    /// Splits a recorded stream into fixed-size byte chunks.
    pub fn from_recording(bytes: &[u8], chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        ScriptedResponse::Chunks(bytes.chunks(chunk_size).map(<[u8]>::to_vec).collect())
    }
}

/// Transport that replays scripted responses in order, one per `open`.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<Vec<ScriptedResponse>>>,
    opened: Arc<Mutex<Vec<GenerateRequest>>>,
    repeat_last: bool,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            opened: Arc::new(Mutex::new(Vec::new())),
            repeat_last: false,
        }
    }

    /// Serves the same response to every `open`, for replaying a recording.
    pub fn repeating(response: ScriptedResponse) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![response])
        }
    }

    /// Requests seen so far, in open order.
    pub fn opened_requests(&self) -> Vec<GenerateRequest> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }

    fn next_response(&self, request: &GenerateRequest) -> Result<ByteStream, TransportError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(request.clone());
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| match responses.len() {
                0 => None,
                1 if self.repeat_last => responses.first().cloned(),
                _ => Some(responses.remove(0)),
            })
            .ok_or_else(|| {
                TransportError::Io(std::io::Error::other(
                    "ScriptedTransport: no more responses configured",
                ))
            })?;

        match response {
            ScriptedResponse::Chunks(chunks) => {
                let items: Vec<Result<Bytes, TransportError>> =
                    chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))).collect();
                Ok(Box::pin(stream::iter(items)))
            }
            ScriptedResponse::Interrupted(chunks) => {
                let mut items: Vec<Result<Bytes, TransportError>> =
                    chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))).collect();
                items.push(Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ))));
                Ok(Box::pin(stream::iter(items)))
            }
            ScriptedResponse::Rejected { status, message } => {
                Err(TransportError::Rejected { status, message })
            }
        }
    }
}

impl Transport for ScriptedTransport {
    fn open<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>> {
        let result = self.next_response(request);
        Box::pin(async move { result })
    }
}
