use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server rejected the request with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Text shown to the user when the session fails because of this error.
    ///
    /// Server rejections carry their own explanation (validation, rate limit);
    /// everything else collapses to the generic retry message.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
