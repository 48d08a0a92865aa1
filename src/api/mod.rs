pub mod client;
pub mod error;
pub mod scripted;
pub mod stream;

pub use client::{ByteStream, GenerationClient};
pub use error::{TransportError, GENERIC_FAILURE_MESSAGE};
pub use scripted::{ScriptedResponse, ScriptedTransport};
pub use stream::{decode_event_stream, StreamDecoder};

use crate::request::GenerateRequest;
use futures::future::BoxFuture;

/// Opens the readable byte stream for one generation request.
///
/// Dropping the returned stream abandons the underlying connection.
pub trait Transport: Send + Sync {
    fn open<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>>;
}
