use super::render::{RenderCommand, RenderSink};
use super::state::{SessionId, SessionState};
use crate::api::{TransportError, GENERIC_FAILURE_MESSAGE};
use crate::types::ProtocolEvent;

/// Upper bound on placeholders created from one `sources` event. Larger
/// counts are clamped, and articles indexed past the cap are ignored as out
/// of range.
pub const MAX_PLACEHOLDERS: usize = 256;

/// Whether the caller should keep feeding events from the current stream.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Owns the state of one generation submission at a time and turns protocol
/// events into render commands.
///
/// Every mutation is keyed by the `SessionId` returned from `start`; once a
/// session settles or is cancelled its id stops being accepted, so late
/// events from an abandoned stream never reach the renderer.
pub struct SessionController<S: RenderSink> {
    sink: S,
    state: SessionState,
    current: Option<SessionId>,
    next_id: u64,
    article_seen: bool,
}

impl<S: RenderSink> SessionController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: SessionState::Idle,
            current: None,
            next_id: 0,
            article_seen: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.current
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Begins a new session, cancelling any live one first.
    pub fn start(&mut self) -> SessionId {
        if self.state.is_live() {
            tracing::info!(
                previous = ?self.current,
                "new submission replaces live session"
            );
            self.cancel();
        }

        self.next_id += 1;
        let session = SessionId(self.next_id);
        self.current = Some(session);
        self.state = SessionState::Awaiting;
        self.article_seen = false;
        self.sink.apply(RenderCommand::ShowLoading);
        tracing::info!(%session, "session started");
        session
    }

    /// Abandons the live session and returns to `Idle`.
    ///
    /// Returns false when there was nothing live to cancel.
    pub fn cancel(&mut self) -> bool {
        if !self.state.is_live() {
            return false;
        }

        if let Some(session) = self.current.take() {
            tracing::info!(%session, state = self.state.label(), "session cancelled");
        }
        self.state = SessionState::Idle;
        self.sink.apply(RenderCommand::Reset);
        true
    }

    pub fn on_event(&mut self, session: SessionId, event: ProtocolEvent) -> Flow {
        if !self.accepts(session) {
            tracing::debug!(
                %session,
                kind = event.kind(),
                "discarding event for inactive session"
            );
            return Flow::Stop;
        }

        let flow = if event.is_terminal() {
            Flow::Stop
        } else {
            Flow::Continue
        };

        match event {
            ProtocolEvent::Status { message } => {
                self.sink.apply(RenderCommand::SetStatus(message));
            }
            ProtocolEvent::SourcesFound { count } => self.on_sources_found(session, count),
            ProtocolEvent::Article { index, article } => {
                self.article_seen = true;
                let SessionState::Collecting { expected, received } = &mut self.state else {
                    tracing::warn!(
                        %session,
                        index,
                        state = self.state.label(),
                        "ignoring article received before sources"
                    );
                    return flow;
                };

                if index >= *expected {
                    tracing::warn!(
                        %session,
                        index,
                        expected = *expected,
                        "ignoring article with out-of-range index"
                    );
                    return flow;
                }

                if !received.insert(index) {
                    tracing::debug!(%session, index, "re-rendering duplicate article");
                }
                self.sink.apply(RenderCommand::RenderResult {
                    index,
                    content: article.content,
                    source: article.source,
                });
            }
            ProtocolEvent::Error { message } => {
                tracing::warn!(%session, %message, "server reported error");
                self.fail(message);
            }
            ProtocolEvent::Done => self.on_done(session),
        }
        flow
    }

    pub fn on_transport_failure(&mut self, session: SessionId, error: &TransportError) -> Flow {
        if !self.accepts(session) {
            return Flow::Stop;
        }

        tracing::warn!(%session, %error, "transport failed mid-session");
        self.fail(error.user_message());
        Flow::Stop
    }

    /// The stream ended without `done` or `error`.
    pub fn on_stream_end(&mut self, session: SessionId) -> Flow {
        if !self.accepts(session) {
            return Flow::Stop;
        }

        tracing::warn!(
            %session,
            state = self.state.label(),
            "stream ended before the server finished"
        );
        self.fail(GENERIC_FAILURE_MESSAGE.to_string());
        Flow::Stop
    }

    fn accepts(&self, session: SessionId) -> bool {
        self.current == Some(session) && self.state.is_live()
    }

    fn on_sources_found(&mut self, session: SessionId, count: usize) {
        if self.state != SessionState::Awaiting {
            tracing::warn!(
                %session,
                count,
                state = self.state.label(),
                "ignoring repeated sources event"
            );
            return;
        }
        if self.article_seen {
            tracing::warn!(%session, count, "ignoring sources event after an article");
            return;
        }

        let expected = if count > MAX_PLACEHOLDERS {
            tracing::warn!(
                %session,
                count,
                cap = MAX_PLACEHOLDERS,
                "clamping sources count"
            );
            MAX_PLACEHOLDERS
        } else {
            count
        };

        self.state = SessionState::Collecting {
            expected,
            received: Default::default(),
        };
        self.sink.apply(RenderCommand::CreatePlaceholders(expected));
    }

    fn on_done(&mut self, session: SessionId) {
        let (expected, received) = match &self.state {
            SessionState::Collecting { expected, received } => (*expected, received.len()),
            _ => (0, 0),
        };
        let missing = expected.saturating_sub(received);

        if missing > 0 {
            tracing::warn!(
                %session,
                expected,
                received,
                "server finished with articles missing"
            );
            self.sink.apply(RenderCommand::ShowWarning(format!(
                "Finished early: {received} of {expected} articles arrived."
            )));
        }

        self.state = SessionState::Succeeded { missing };
        self.sink.apply(RenderCommand::ClearProgress);
        tracing::info!(%session, articles = received, "session succeeded");
    }

    fn fail(&mut self, reason: String) {
        self.sink.apply(RenderCommand::ShowError(reason.clone()));
        self.state = SessionState::Failed { reason };
    }
}
