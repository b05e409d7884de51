mod cli;
mod config;
mod connection;
mod severity;
mod terminal;
mod ui;

use crate::cli::Args;
use crate::config::Config;
use crate::connection::ClassifierConnection;
use crate::terminal::{init_tracing, restore_terminal, setup_terminal};
use crate::ui::{draw_ui, handle_key_event, AppState, UiCommand};
use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use protocol::{ClientEvent, ServerEvent};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _file_guard = init_tracing(&args.log_dir, args.log_to_stderr)?;

    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    // One attempt, no retry. A failed connect still brings the console up;
    // submits are refused until a restart.
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(128);
    let connection = match ClassifierConnection::connect(&config.endpoint, event_tx).await {
        Ok(connection) => Some(connection),
        Err(err) => {
            tracing::warn!(error = %err, endpoint = %config.endpoint, "classifier connect failed");
            None
        }
    };

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<UiCommand>(16);
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            if let Some(connection) = &connection {
                connection.shutdown();
            }
            return Err(err);
        }
    };
    let mut app = AppState::new(&config);

    let loop_result = run_app(
        &mut terminal,
        &mut app,
        connection.as_ref(),
        &mut event_rx,
        &mut cmd_rx,
        cmd_tx,
    )
    .await;

    // Teardown runs on success and error paths alike; shutdown is idempotent.
    if let Some(connection) = &connection {
        connection.shutdown();
    }
    restore_terminal(&mut terminal)?;
    loop_result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    connection: Option<&ClassifierConnection>,
    event_rx: &mut mpsc::Receiver<ServerEvent>,
    cmd_rx: &mut mpsc::Receiver<UiCommand>,
    cmd_tx: mpsc::Sender<UiCommand>,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);
    loop {
        while let Ok(server_event) = event_rx.try_recv() {
            app.handle_event(server_event);
        }
        while let Ok(command) = cmd_rx.try_recv() {
            match command {
                UiCommand::Submit => submit(app, connection),
            }
        }
        app.set_connected(connection.is_some_and(ClassifierConnection::is_connected));
        app.poll_timeout(Instant::now());

        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(key, app, cmd_tx.clone()) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn submit(app: &mut AppState, connection: Option<&ClassifierConnection>) {
    let connected = connection.is_some_and(ClassifierConnection::is_connected);
    let Some(request) = app.begin_submit(connected) else {
        return;
    };
    let Some(connection) = connection else {
        return;
    };
    tracing::info!(
        event = "classify_submitted",
        system_prompt_len = request.system_prompt.len(),
        user_prompt_len = request.user_prompt.len(),
    );
    if let Err(err) = connection.try_emit(ClientEvent::ClassifyPrompt(request)) {
        tracing::warn!(error = %err, "classify request dropped");
        app.abort_submit(err.to_string());
    }
}
