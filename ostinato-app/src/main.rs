//! Ostinato - Terminal Loop Player
//!
//! Load an audio file, play it in a loop, and bend tempo and pitch
//! independently while a live waveform scope rolls.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use ostinato_audio::{
    AudioCommand, AudioEngine, AudioEvent, AudioSource, EngineState, OutputContext, ToggleAction,
};
use ostinato_input::{Command, InputHandler};
use ostinato_library::{LoadWorker, TrackLoader};
use ostinato_tui::{
    App, ControlsWidget, HelpWidget, ScopeWidget, StatusBarWidget, Theme, TransportWidget,
    CRT_GREEN,
};

/// Frame rate for UI updates
const FPS: u64 = 30;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Optional track to load at startup
    let initial_path = std::env::args().nth(1).map(PathBuf::from);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Create audio channels
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_audio = shutdown.clone();

    // Spawn audio control thread
    let audio_handle = thread::spawn(move || {
        run_audio_thread(cmd_rx, evt_tx, shutdown_audio);
    });

    // Create engine handle for main thread
    let engine = AudioEngine::new(cmd_tx, evt_rx);

    // Run main event loop
    let result = run_app(&mut terminal, engine, shutdown.clone(), initial_path);

    // Cleanup
    shutdown.store(true, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Wait for audio thread
    let _ = audio_handle.join();

    result
}

fn run_audio_thread(
    cmd_rx: Receiver<AudioCommand>,
    evt_tx: Sender<AudioEvent>,
    shutdown: Arc<AtomicBool>,
) {
    // Probe the output device up front; the stream itself is only built on
    // the first playback start.
    let mut output = match OutputContext::open() {
        Ok(output) => output,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!("Audio unavailable: {e}")));
            return;
        }
    };

    let _ = evt_tx.send(AudioEvent::EngineReady {
        sample_rate: output.sample_rate(),
    });

    let engine_state = Arc::new(Mutex::new(EngineState::new(output.sample_rate())));

    // State update interval (~30fps)
    let mut last_state_update = Instant::now();
    let state_update_interval = Duration::from_millis(33);

    while !shutdown.load(Ordering::Relaxed) {
        match cmd_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(AudioCommand::Shutdown) => break,
            Ok(AudioCommand::TogglePlayPause) => {
                let action = match engine_state.lock() {
                    Ok(mut state) => state.toggle_play_pause(),
                    Err(_) => ToggleAction::Ignored,
                };
                // Activation happens outside the state lock: the stream
                // callback takes the same lock.
                if action == ToggleAction::StartRequested {
                    match output.activate(engine_state.clone()) {
                        Ok(()) => {
                            if let Ok(mut state) = engine_state.lock() {
                                state.confirm_start();
                            }
                        }
                        Err(e) => {
                            if let Ok(mut state) = engine_state.lock() {
                                state.abort_start();
                            }
                            let _ = evt_tx
                                .try_send(AudioEvent::Error(format!("Could not start playback: {e}")));
                        }
                    }
                }
            }
            Ok(cmd) => {
                let event = match engine_state.lock() {
                    Ok(mut state) => state.handle_command(cmd),
                    Err(_) => None,
                };
                if let Some(event) = event {
                    let _ = evt_tx.try_send(event);
                }
            }
            Err(_) => {}
        }

        // Send state updates periodically
        if last_state_update.elapsed() >= state_update_interval {
            if let Ok(state) = engine_state.lock() {
                let _ = evt_tx.try_send(AudioEvent::StateUpdate(state.snapshot()));
            }
            last_state_update = Instant::now();
        }
    }

    // Teardown on every exit path: dispose the graph, then drop the stream
    if let Ok(mut state) = engine_state.lock() {
        state.teardown();
    }
    output.shutdown();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: AudioEngine,
    shutdown: Arc<AtomicBool>,
    initial_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    let mut input_handler = InputHandler::new();

    // Created once the audio thread reports its sample rate
    let mut worker: Option<LoadWorker> = None;
    let mut pending_path = initial_path;

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    app.state
        .set_message("OSTINATO - :load <path> to drop a loop, ? for help");

    loop {
        // Check for shutdown
        if shutdown.load(Ordering::Relaxed) || app.should_quit {
            engine.send(AudioCommand::Shutdown);
            break;
        }

        // Process audio events
        while let Ok(event) = engine.event_rx.try_recv() {
            if let AudioEvent::EngineReady { sample_rate } = event {
                if worker.is_none() {
                    let fresh = LoadWorker::spawn(TrackLoader::with_sample_rate(sample_rate));
                    if let Some(path) = pending_path.take() {
                        request_load(&mut app, &engine, &fresh, path);
                    }
                    worker = Some(fresh);
                }
                continue;
            }
            app.state.handle_audio_event(event);
        }

        // Poll finished loads; superseded outcomes never surface here
        if let Some(worker) = worker.as_ref() {
            if let Some(outcome) = worker.poll_current() {
                match outcome.result {
                    Ok(track) => {
                        let name = if track.metadata.title != "Unknown" {
                            Some(track.metadata.title.clone())
                        } else {
                            outcome
                                .path
                                .file_name()
                                .map(|s| s.to_string_lossy().to_string())
                        };
                        let source =
                            AudioSource::new(Arc::new(track.samples), track.sample_rate, name);
                        engine.send(AudioCommand::InstallSource(source));
                    }
                    Err(e) => {
                        engine.send(AudioCommand::LoadFailed(format!(
                            "Failed to load {}: {e}",
                            outcome.path.display()
                        )));
                    }
                }
            }
        }

        // Sample the analysis tap every frame, playing or paused
        app.state.sample_scope();
        app.state.frame_count = app.state.frame_count.wrapping_add(1);

        // Render
        terminal.draw(|frame| {
            render_ui(frame, &mut app);
        })?;

        // Handle input
        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Handle quit shortcut
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.quit();
                    continue;
                }

                if let Some(cmd) = input_handler.handle_key(key) {
                    handle_command(&mut app, &engine, worker.as_ref(), cmd);
                }

                // Update mode in app state
                app.state.set_mode(input_handler.mode());
                app.state.command_buffer = input_handler.command_buffer().to_string();
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    Ok(())
}

fn handle_command(
    app: &mut App,
    engine: &AudioEngine,
    worker: Option<&LoadWorker>,
    cmd: Command,
) {
    match cmd {
        Command::TogglePlayPause => engine.send(AudioCommand::TogglePlayPause),

        Command::AdjustTempo(delta) => {
            let tempo = app.state.tempo.adjust(delta);
            app.state.tempo = tempo;
            engine.send(AudioCommand::SetTempoPercent(tempo));
        }
        Command::AdjustPitch(delta) => {
            let pitch = app.state.pitch.adjust(delta);
            app.state.pitch = pitch;
            engine.send(AudioCommand::SetPitchPercent(pitch));
        }
        Command::ResetControls => {
            app.state.tempo = Default::default();
            app.state.pitch = Default::default();
            engine.send(AudioCommand::SetTempoPercent(app.state.tempo));
            engine.send(AudioCommand::SetPitchPercent(app.state.pitch));
            app.state.set_message("Controls reset to 100%");
        }

        Command::LoadTrack(path) => match worker {
            Some(worker) => request_load(app, engine, worker, path),
            None => app.state.set_error("Audio engine not ready"),
        },

        Command::ToggleHelp => app.state.toggle_help(),
        Command::Quit => app.quit(),

        Command::ExecuteCommand(raw) => {
            app.state.set_warning(format!("Unknown command: :{raw}"));
        }

        // Mode changes are tracked via the input handler after dispatch
        Command::EnterCommandMode | Command::EnterNormalMode | Command::Cancel => {}
    }
}

/// Kick off a background load; a request in flight is superseded
fn request_load(app: &mut App, engine: &AudioEngine, worker: &LoadWorker, path: PathBuf) {
    app.state.set_message(format!("Loading {}...", path.display()));
    engine.send(AudioCommand::BeginLoad);
    worker.request(path);
}

fn render_ui(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    let theme = &CRT_GREEN;

    // Clear with background
    let block = ratatui::widgets::Block::default().style(theme.normal());
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Length(3), // Transport
        Constraint::Min(8),    // Scope
        Constraint::Length(4), // Controls
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], theme);

    let transport = TransportWidget::new(app.state.playback, theme)
        .track_name(app.state.track_name.as_deref())
        .position(app.state.position_secs, app.state.duration_secs);
    frame.render_widget(transport, chunks[1]);

    let scope = ScopeWidget::new(app.state.scope_frame(), theme);
    frame.render_widget(scope, chunks[2]);

    let controls = ControlsWidget::new(app.state.tempo, app.state.pitch, theme);
    frame.render_widget(controls, chunks[3]);

    let status = StatusBarWidget::new(app.state.mode, &app.state.command_buffer, theme)
        .message(app.state.message.as_deref(), app.state.message_type);
    frame.render_widget(status, chunks[4]);

    // Help overlay
    if app.state.show_help {
        let help_area = centered_rect(46, 13, area);
        frame.render_widget(HelpWidget::new(theme), help_area);
    }
}

fn render_title(frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let title_text = " OSTINATO - Terminal Loop Player ";
    let padding = (area.width as usize).saturating_sub(title_text.len()) / 2;
    let padded = format!(
        "{:═<pad$}{}{:═<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = (area.width as usize)
            .saturating_sub(padding)
            .saturating_sub(title_text.len())
    );

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
