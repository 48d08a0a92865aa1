mod protocol;

pub use protocol::{GeneratedArticle, ProtocolEvent, Source};
