#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use giffos_clipboard::DefaultClipboard;
use giffos_core::{AppConfig, AppPaths, JsonFileStore, QualityMode};
use giffos_provider::GiphyClient;
use giffos_session::{run_session, SessionCommand, SessionDeps, SessionEvent};
use std::path::Path;
use std::sync::Arc;
use tauri::{command, Emitter, Manager, PhysicalPosition, State, WebviewWindow};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Distance kept from the monitor's right and bottom edges; the bottom margin
// leaves room for a taskbar.
const DOCK_MARGIN_RIGHT: i32 = 24;
const DOCK_MARGIN_BOTTOM: i32 = 48;

struct AppState {
    command_tx: mpsc::Sender<SessionCommand>,
    _log_guard: WorkerGuard,
}

async fn enqueue(state: &AppState, cmd: SessionCommand) -> Result<(), String> {
    state
        .command_tx
        .send(cmd)
        .await
        .map_err(|_| "Session is not running".to_string())
}

#[command]
async fn set_query(text: String, state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::SetQuery(text)).await
}

#[command]
async fn set_quality(hd: bool, state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::SetQuality(QualityMode::from_hd(hd))).await
}

#[command]
async fn set_api_key(key: String, state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::SetApiKey(key)).await
}

#[command]
async fn load_more(state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::LoadMore).await
}

#[command]
async fn select_gif(index: usize, state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::Select(index)).await
}

#[command]
async fn copy_gif(state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::Copy).await
}

/// Called by the page once it listens for `session-event`. Events emitted
/// before that, such as the stored API key, are replayed.
#[command]
async fn frontend_ready(state: State<'_, AppState>) -> Result<(), String> {
    enqueue(&state, SessionCommand::Resync).await
}

#[command]
fn close_window(window: WebviewWindow) {
    if let Err(e) = window.close() {
        tracing::error!("Failed to close window: {}", e);
    }
}

/// Moves the window into the bottom-right corner of the monitor it is on.
fn dock_to_corner(window: &WebviewWindow) -> tauri::Result<()> {
    let Some(monitor) = window.current_monitor()? else {
        return Ok(());
    };
    let origin = monitor.position();
    let screen = monitor.size();
    let size = window.outer_size()?;

    let x = origin.x + screen.width as i32 - size.width as i32 - DOCK_MARGIN_RIGHT;
    let y = origin.y + screen.height as i32 - size.height as i32 - DOCK_MARGIN_BOTTOM;
    window.set_position(PhysicalPosition::new(x, y))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Daily log file in `log_dir`; debug builds also echo to stdout.
fn init_logging(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "giffos.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let stdout = cfg!(debug_assertions).then(fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(stdout)
        .init();
    guard
}

fn start(app: &mut tauri::App) -> Result<()> {
    let resolver = app.path();
    let log_guard = init_logging(&resolver.app_log_dir()?);
    let paths = AppPaths {
        config_dir: resolver.app_config_dir()?,
        cache_dir: resolver.app_cache_dir()?,
    };

    let config = tauri::async_runtime::block_on(AppConfig::load_or_default(&paths.settings_file()))
        .context("Failed to load settings")?;
    let provider = GiphyClient::from_config(&config.search).context("Failed to set up the Giphy client")?;
    let scratch_path = paths.scratch_file(&config.clipboard.scratch_file_name);
    let deps = SessionDeps {
        config,
        provider: Arc::new(provider),
        clipboard: Arc::new(DefaultClipboard::new()),
        store: Arc::new(JsonFileStore::new(paths.store_file())),
        scratch_path,
    };

    if let Some(window) = app.get_webview_window("main") {
        if let Err(e) = dock_to_corner(&window) {
            tracing::error!("Window reposition failed: {}", e);
        }
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, mut event_rx) = mpsc::channel(100);

    let session_tx = event_tx.clone();
    tauri::async_runtime::spawn(async move {
        if let Err(e) = run_session(deps, cmd_rx, session_tx.clone()).await {
            let _ = session_tx.send(SessionEvent::Error(e.to_string())).await;
        }
    });
    drop(event_tx);

    // Event Forwarder Loop
    let handle = app.handle().clone();
    tauri::async_runtime::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Err(e) = handle.emit("session-event", &event) {
                tracing::warn!("Failed to forward session event: {}", e);
            }
        }
    });

    app.manage(AppState {
        command_tx: cmd_tx,
        _log_guard: log_guard,
    });
    Ok(())
}

fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            if let Some(window) = app.get_webview_window("main") {
                let _ = window.set_focus();
            }
        }))
        .setup(|app| {
            start(app)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            set_query,
            set_quality,
            set_api_key,
            load_more,
            select_gif,
            copy_gif,
            frontend_ready,
            close_window
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
