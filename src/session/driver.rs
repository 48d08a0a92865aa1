use super::controller::{Flow, SessionController};
use super::render::RenderSink;
use super::state::{SessionId, SessionState};
use crate::api::{decode_event_stream, Transport};
use crate::request::GenerateRequest;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Succeeded { missing: usize },
    Failed { reason: String },
    Cancelled,
}

/// Runs one submission from `start` to a settled state.
///
/// Cancellation is checked before the transport opens, while waiting for each
/// event, and again after every read completes; anything read after the token
/// fired is dropped without touching the controller.
pub async fn run_session<S, T>(
    controller: &mut SessionController<S>,
    transport: &T,
    request: &GenerateRequest,
    cancel: &CancellationToken,
) -> SessionOutcome
where
    S: RenderSink,
    T: Transport + ?Sized,
{
    let session = controller.start();

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = transport.open(request) => Some(result),
    };
    let bytes = match opened {
        None => return abandon(controller, session),
        Some(_) if cancel.is_cancelled() => return abandon(controller, session),
        Some(Ok(bytes)) => bytes,
        Some(Err(error)) => {
            let _ = controller.on_transport_failure(session, &error);
            return settled_outcome(controller.state());
        }
    };

    let mut events = std::pin::pin!(decode_event_stream(bytes));
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return abandon(controller, session),
            next = events.next() => next,
        };
        if cancel.is_cancelled() {
            return abandon(controller, session);
        }

        let flow = match next {
            Some(Ok(event)) => controller.on_event(session, event),
            Some(Err(error)) => controller.on_transport_failure(session, &error),
            None => controller.on_stream_end(session),
        };
        if flow == Flow::Stop {
            return settled_outcome(controller.state());
        }
    }
}

fn abandon<S: RenderSink>(
    controller: &mut SessionController<S>,
    session: SessionId,
) -> SessionOutcome {
    if controller.current_session() == Some(session) {
        controller.cancel();
    }
    SessionOutcome::Cancelled
}

// `Flow::Stop` is only returned once the session has settled or stopped
// being current, so a live state here means someone else took over.
fn settled_outcome(state: &SessionState) -> SessionOutcome {
    match state {
        SessionState::Succeeded { missing } => SessionOutcome::Succeeded { missing: *missing },
        SessionState::Failed { reason } => SessionOutcome::Failed {
            reason: reason.clone(),
        },
        SessionState::Idle | SessionState::Awaiting | SessionState::Collecting { .. } => {
            SessionOutcome::Cancelled
        }
    }
}
