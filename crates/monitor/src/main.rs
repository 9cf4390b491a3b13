mod cli;
mod headless;
mod layers;
mod report;

use crate::cli::Args;
use crate::headless::run_headless;
use crate::layers::service::{init_tracing, spawn_health_probe, DetectClient, LogOptions, UiEvent};
use crate::layers::storage::{load_settings, load_theme, LocalStore};
use crate::layers::ui::terminal::Tui;
use crate::layers::ui::{
    draw_ui, handle_key_event, handle_paste, restore_terminal, setup_terminal, AppState, UiContext,
};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DEFAULT_REPORT_FILE: &str = "aigc-report.html";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let _file_guard = init_tracing(&LogOptions {
        dir: args.log_dir.clone(),
        to_stderr: args.log_to_stderr,
        interactive: !args.is_headless(),
    })?;

    let store_root = match &args.store_dir {
        Some(dir) => dir.clone(),
        None => LocalStore::default_root()?,
    };
    let store = LocalStore::open(store_root);
    tracing::info!(
        event = "monitor.start",
        server = %args.server,
        store = %store.root().display(),
        headless = args.is_headless(),
    );

    if let Some(text_file) = &args.text_file {
        let code = run_headless(&args, &store, text_file).await?;
        return Ok(ExitCode::from(code));
    }

    let client = DetectClient::new(&args.server)?;
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiEvent>(128);
    spawn_health_probe(client.clone(), ui_tx.clone());

    let mut app = AppState::new(args.server.clone(), &load_settings(&store), load_theme(&store));
    let ctx = UiContext {
        store,
        client,
        ui_tx,
        report_path: args
            .html_out
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE)),
    };

    let mut terminal = setup_terminal()?;
    let outcome = run_ui(&mut terminal, &mut app, &ctx, &mut ui_rx);
    restore_terminal(&mut terminal)?;
    outcome?;
    tracing::info!(event = "monitor.exit");
    Ok(ExitCode::SUCCESS)
}

fn run_ui(
    terminal: &mut Tui,
    app: &mut AppState,
    ctx: &UiContext,
    ui_rx: &mut mpsc::Receiver<UiEvent>,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);
    loop {
        while let Ok(event) = ui_rx.try_recv() {
            app.handle_event(event);
        }
        app.expire_toast(Instant::now());

        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key_event(key, app, ctx) {
                        return Ok(());
                    }
                }
                Event::Paste(text) => handle_paste(&text, app),
                _ => {}
            }
        }
    }
}
