use serde::{Deserialize, Serialize};

/// One decoded `data: ` frame from the generation stream.
///
/// The `type` tag selects the variant; unknown tags and missing fields fail to
/// deserialize and the frame is dropped by the decoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Status {
        message: String,
    },
    #[serde(rename = "sources")]
    SourcesFound {
        count: usize,
    },
    Article {
        index: usize,
        article: GeneratedArticle,
    },
    Error {
        message: String,
    },
    Done,
}

impl ProtocolEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ProtocolEvent::Status { .. } => "status",
            ProtocolEvent::SourcesFound { .. } => "sources",
            ProtocolEvent::Article { .. } => "article",
            ProtocolEvent::Error { .. } => "error",
            ProtocolEvent::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProtocolEvent::Error { .. } | ProtocolEvent::Done)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub content: String,
    pub source: Source,
}

/// The news item an article was written from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    pub title: String,
}
