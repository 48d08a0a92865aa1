use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use meish::api::{GenerationClient, ScriptedResponse, ScriptedTransport, Transport};
use meish::config::Config;
use meish::logging;
use meish::request::{GenerateRequest, TopicChoice, WritingSample, TOPIC_PRESETS};
use meish::session::{run_session, RenderCommand, RenderSink, SessionController, SessionOutcome};
use meish::terminal::TerminalSession;
use meish::ui::render::render_view;
use meish::ui::{PlainPrinter, ResultsView};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const PAGE_SCROLL_LINES: usize = 10;

#[derive(Debug, Parser)]
#[command(
    name = "meish",
    version,
    about = "Stream news articles rewritten in your own voice"
)]
struct Cli {
    /// Preset topic key (see --list-topics).
    #[arg(long, conflicts_with = "custom_topic")]
    topic: Option<String>,

    /// Free-text topic; takes the place of a preset.
    #[arg(long)]
    custom_topic: Option<String>,

    /// Writing sample to learn your style from. Repeatable.
    #[arg(long = "sample", value_name = "FILE")]
    samples: Vec<PathBuf>,

    /// Let the server use its built-in sample style instead of uploads.
    #[arg(long)]
    use_sample_style: bool,

    /// Overrides MEISH_API_URL.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Replay a recorded event stream instead of calling the server.
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Chunk size in bytes used when replaying a recording.
    #[arg(long, default_value_t = 64, requires = "replay")]
    chunk_size: usize,

    /// Print events as plain lines instead of drawing the terminal UI.
    #[arg(long)]
    plain: bool,

    /// List preset topics and exit.
    #[arg(long)]
    list_topics: bool,
}

type ChannelController = SessionController<mpsc::UnboundedSender<RenderCommand>>;

struct ActiveRun {
    token: CancellationToken,
    handle: JoinHandle<(ChannelController, SessionOutcome)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Cancel,
    Resubmit,
    Quit,
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollHome,
    Ignore,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.list_topics {
        for (key, description) in TOPIC_PRESETS {
            println!("{key:<14} {description}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load()?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.trim().to_string();
    }
    config.validate()?;
    logging::init(&config)?;

    let request = build_request(&cli)?;
    let transport = build_transport(&cli, &config)?;

    if cli.plain || !std::io::stdout().is_terminal() {
        run_plain(transport, request).await
    } else {
        run_interactive(transport, request).await
    }
}

fn build_request(cli: &Cli) -> Result<GenerateRequest> {
    let topic = match (&cli.topic, &cli.custom_topic) {
        (_, Some(custom)) => TopicChoice::Custom(custom.clone()),
        (Some(preset), None) => TopicChoice::Preset(preset.clone()),
        (None, None) => bail!("Choose a topic with --topic or --custom-topic"),
    };
    let samples = cli
        .samples
        .iter()
        .map(|path| WritingSample::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    GenerateRequest::new(topic, samples, cli.use_sample_style)
}

fn build_transport(cli: &Cli, config: &Config) -> Result<Arc<dyn Transport>> {
    match &cli.replay {
        Some(path) => {
            let recording = std::fs::read(path)
                .with_context(|| format!("failed to read recording {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = recording.len(), "replaying recording");
            Ok(Arc::new(ScriptedTransport::repeating(
                ScriptedResponse::from_recording(&recording, cli.chunk_size),
            )))
        }
        None => {
            let client = GenerationClient::new(config)?;
            tracing::info!(api_url = client.api_url(), "using generation service");
            Ok(Arc::new(client))
        }
    }
}

async fn run_plain(transport: Arc<dyn Transport>, request: GenerateRequest) -> Result<ExitCode> {
    let mut controller = SessionController::new(PlainPrinter::new(std::io::stdout()));
    let token = CancellationToken::new();

    let interrupt_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt_token.cancel();
        }
    });

    let outcome = run_session(&mut controller, transport.as_ref(), &request, &token).await;
    tracing::info!(?outcome, "plain session finished");

    Ok(ExitCode::from(exit_status(Some(&outcome))))
}

async fn run_interactive(
    transport: Arc<dyn Transport>,
    request: GenerateRequest,
) -> Result<ExitCode> {
    let mut screen = TerminalSession::enter()?;
    let (render_tx, mut render_rx) = mpsc::unbounded_channel();
    let topic = request.topic_description().to_string();

    let mut view = ResultsView::default();
    let mut scroll = 0usize;
    let mut idle_controller: Option<ChannelController> = None;
    let mut active = Some(spawn_run(
        SessionController::new(render_tx),
        Arc::clone(&transport),
        request.clone(),
    ));
    let mut last_outcome: Option<SessionOutcome> = None;
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);

    loop {
        screen
            .terminal
            .draw(|frame| render_view(frame, &view, &topic, scroll))?;

        tokio::select! {
            _ = ticker.tick() => {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    match key_action(key, active.is_some()) {
                        KeyAction::Cancel => {
                            if let Some(run) = &active {
                                run.token.cancel();
                            }
                        }
                        KeyAction::Resubmit => {
                            let controller = match active.take() {
                                Some(run) => finish_run(run, &mut last_outcome, true).await?,
                                None => match idle_controller.take() {
                                    Some(controller) => controller,
                                    None => continue,
                                },
                            };
                            scroll = 0;
                            active = Some(spawn_run(
                                controller,
                                Arc::clone(&transport),
                                request.clone(),
                            ));
                        }
                        KeyAction::Quit => {
                            if let Some(run) = active.take() {
                                finish_run(run, &mut last_outcome, true).await?;
                            }
                            return Ok(ExitCode::from(exit_status(last_outcome.as_ref())));
                        }
                        KeyAction::ScrollUp(lines) => scroll = scroll.saturating_sub(lines),
                        KeyAction::ScrollDown(lines) => scroll = scroll.saturating_add(lines),
                        KeyAction::ScrollHome => scroll = 0,
                        KeyAction::Ignore => {}
                    }
                }
            }
            Some(command) = render_rx.recv() => {
                view.apply(command);
                while let Ok(command) = render_rx.try_recv() {
                    view.apply(command);
                }
            }
        }

        if active.as_ref().is_some_and(|run| run.handle.is_finished()) {
            if let Some(run) = active.take() {
                idle_controller = Some(finish_run(run, &mut last_outcome, false).await?);
            }
        }
    }
}

fn spawn_run(
    mut controller: ChannelController,
    transport: Arc<dyn Transport>,
    request: GenerateRequest,
) -> ActiveRun {
    let token = CancellationToken::new();
    let run_token = token.clone();
    let handle = tokio::spawn(async move {
        let outcome = run_session(&mut controller, transport.as_ref(), &request, &run_token).await;
        (controller, outcome)
    });
    ActiveRun { token, handle }
}

async fn finish_run(
    run: ActiveRun,
    last_outcome: &mut Option<SessionOutcome>,
    cancel: bool,
) -> Result<ChannelController> {
    if cancel {
        run.token.cancel();
    }
    let (controller, outcome) = run.handle.await.context("session task panicked")?;
    tracing::info!(?outcome, "interactive session finished");
    *last_outcome = Some(outcome);
    Ok(controller)
}

fn key_action(key: KeyEvent, session_live: bool) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            if session_live {
                KeyAction::Cancel
            } else {
                KeyAction::Quit
            }
        }
        KeyCode::Esc if session_live => KeyAction::Cancel,
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('r') => KeyAction::Resubmit,
        KeyCode::Up | KeyCode::Char('k') => KeyAction::ScrollUp(1),
        KeyCode::Down | KeyCode::Char('j') => KeyAction::ScrollDown(1),
        KeyCode::PageUp => KeyAction::ScrollUp(PAGE_SCROLL_LINES),
        KeyCode::PageDown | KeyCode::Char(' ') => KeyAction::ScrollDown(PAGE_SCROLL_LINES),
        KeyCode::Home => KeyAction::ScrollHome,
        _ => KeyAction::Ignore,
    }
}

fn exit_status(outcome: Option<&SessionOutcome>) -> u8 {
    match outcome {
        Some(SessionOutcome::Succeeded { .. }) => 0,
        Some(SessionOutcome::Failed { .. }) => 1,
        Some(SessionOutcome::Cancelled) | None => 130,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_ctrl_c_cancels_live_session_then_quits() {
        let ctrl_c = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_action(ctrl_c, true), KeyAction::Cancel);
        assert_eq!(key_action(ctrl_c, false), KeyAction::Quit);
    }

    #[test]
    fn test_escape_only_cancels_live_session() {
        let esc = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(key_action(esc, true), KeyAction::Cancel);
        assert_eq!(key_action(esc, false), KeyAction::Ignore);
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(
            key_action(press(KeyCode::PageDown, KeyModifiers::NONE), false),
            KeyAction::ScrollDown(PAGE_SCROLL_LINES)
        );
        assert_eq!(
            key_action(press(KeyCode::Char('k'), KeyModifiers::NONE), true),
            KeyAction::ScrollUp(1)
        );
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut key = press(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(key_action(key, false), KeyAction::Ignore);
    }

    #[test]
    fn test_custom_topic_takes_precedence() {
        let cli = Cli::parse_from(["meish", "--custom-topic", "rust", "--use-sample-style"]);
        let request = build_request(&cli).unwrap();
        assert_eq!(request.topic(), &TopicChoice::Custom("rust".to_string()));
    }

    #[test]
    fn test_missing_topic_is_rejected() {
        let cli = Cli::parse_from(["meish", "--use-sample-style"]);
        assert!(build_request(&cli).is_err());
    }

    #[test]
    fn test_exit_codes_follow_outcome() {
        assert_eq!(exit_status(Some(&SessionOutcome::Succeeded { missing: 2 })), 0);
        assert_eq!(
            exit_status(Some(&SessionOutcome::Failed {
                reason: "Rate limited".to_string()
            })),
            1
        );
        assert_eq!(exit_status(None), 130);
    }
}
