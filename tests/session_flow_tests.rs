use meish::api::{ScriptedResponse, ScriptedTransport, GENERIC_FAILURE_MESSAGE};
use meish::request::{GenerateRequest, TopicChoice};
use meish::session::{run_session, RenderCommand, SessionController, SessionOutcome, SessionState};
use meish::ui::{ResultsView, Slot, ViewPhase};
use tokio_util::sync::CancellationToken;

const RECORDING: &str = concat!(
    "data: {\"type\":\"status\",\"message\":\"Searching the web...\"}\n",
    "data: {\"type\":\"sources\",\"count\":3}\n",
    "data: {\"type\":\"article\",\"index\":2,\"article\":{\"content\":\"Third\",\"source\":{\"url\":\"https://news.example/c\",\"title\":\"C\"}}}\n",
    "data: {\"type\":\"article\",\"index\":0,\"article\":{\"content\":\"First\",\"source\":{\"url\":\"https://news.example/a\",\"title\":\"A\"}}}\n",
    "data: {\"type\":\"article\",\"index\":1,\"article\":{\"content\":\"Second\",\"source\":{\"url\":\"https://news.example/b\",\"title\":\"B\"}}}\n",
    "data: {\"type\":\"done\"}\n",
);

fn request() -> GenerateRequest {
    GenerateRequest::new(TopicChoice::Custom("rust releases".to_string()), vec![], true).unwrap()
}

#[tokio::test]
async fn test_recording_fills_view_for_any_chunk_size() {
    for chunk_size in [1, 7, 64, RECORDING.len()] {
        let transport = ScriptedTransport::new(vec![ScriptedResponse::from_recording(
            RECORDING.as_bytes(),
            chunk_size,
        )]);
        let mut controller = SessionController::new(ResultsView::default());

        let outcome =
            run_session(&mut controller, &transport, &request(), &CancellationToken::new()).await;

        assert_eq!(outcome, SessionOutcome::Succeeded { missing: 0 }, "chunk size {chunk_size}");
        assert_eq!(controller.state(), &SessionState::Succeeded { missing: 0 });
        let view = controller.sink();
        assert_eq!(view.phase(), ViewPhase::Results);
        assert_eq!(view.filled_count(), 3);
        assert!(matches!(
            &view.slots()[0],
            Slot::Filled { content, .. } if content == "First"
        ));
    }
}

#[tokio::test]
async fn test_server_error_event_surfaces_message() {
    let transport = ScriptedTransport::new(vec![ScriptedResponse::from_lines([
        "data: {\"type\":\"status\",\"message\":\"Searching the web...\"}\n",
        "data: {\"type\":\"error\",\"message\":\"No articles found for this topic\"}\n",
        "data: {\"type\":\"sources\",\"count\":2}\n",
    ])]);
    let mut controller = SessionController::new(Vec::new());

    let outcome =
        run_session(&mut controller, &transport, &request(), &CancellationToken::new()).await;

    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            reason: "No articles found for this topic".to_string()
        }
    );
    assert!(!controller
        .sink()
        .iter()
        .any(|command| matches!(command, RenderCommand::CreatePlaceholders(_))));
}

#[tokio::test]
async fn test_stream_without_terminal_event_fails_generically() {
    let transport = ScriptedTransport::new(vec![ScriptedResponse::from_lines([
        "data: {\"type\":\"sources\",\"count\":1}\n",
    ])]);
    let mut controller = SessionController::new(ResultsView::default());

    let outcome =
        run_session(&mut controller, &transport, &request(), &CancellationToken::new()).await;

    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            reason: GENERIC_FAILURE_MESSAGE.to_string()
        }
    );
    assert_eq!(controller.sink().error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_rejected_request_shows_server_message() {
    let transport = ScriptedTransport::new(vec![ScriptedResponse::Rejected {
        status: 400,
        message: Some("Upload at least one writing sample".to_string()),
    }]);
    let mut controller = SessionController::new(ResultsView::default());

    let outcome =
        run_session(&mut controller, &transport, &request(), &CancellationToken::new()).await;

    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            reason: "Upload at least one writing sample".to_string()
        }
    );
    assert_eq!(controller.sink().phase(), ViewPhase::Input);
    assert_eq!(transport.opened_requests(), vec![request()]);
}

#[tokio::test]
async fn test_resubmit_after_failure_reuses_controller() {
    let transport = ScriptedTransport::new(vec![
        ScriptedResponse::Rejected {
            status: 429,
            message: None,
        },
        ScriptedResponse::from_recording(RECORDING.as_bytes(), 16),
    ]);
    let mut controller = SessionController::new(ResultsView::default());
    let token = CancellationToken::new();

    let first = run_session(&mut controller, &transport, &request(), &token).await;
    assert!(matches!(first, SessionOutcome::Failed { .. }));

    let second = run_session(&mut controller, &transport, &request(), &token).await;
    assert_eq!(second, SessionOutcome::Succeeded { missing: 0 });
    assert_eq!(controller.sink().error(), None);
    assert_eq!(controller.sink().filled_count(), 3);
}
