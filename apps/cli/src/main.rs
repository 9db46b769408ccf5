mod shell;

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use giffos_clipboard::DefaultClipboard;
use giffos_core::{AppConfig, AppPaths, CredentialStore, GifRef, JsonFileStore, QualityMode, API_KEY_ENTRY};
use giffos_provider::GiphyClient;
use giffos_session::{
    run_session, CopyPhase, LogLevel, SessionCommand, SessionDeps, SessionEvent,
};
use shell::{format_event, format_results, parse_line, ShellInput, HELP};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WAIT_LIMIT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(author, version, about = "Search Giphy and copy GIFs to the clipboard", long_about = None)]
struct Cli {
    /// Settings file (defaults to settings.json in the giffos config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Use this API key and save it for next time
    #[arg(long, global = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session reading commands from stdin
    Shell,
    /// Run one search, print the results and optionally copy one
    Search {
        query: String,
        /// Fetch the HD rendition
        #[arg(long)]
        hd: bool,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Result number to copy (1-based)
        #[arg(long)]
        copy: Option<usize>,
    },
    /// Save the Giphy API key
    Key { value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results; logs go to stderr.
    let (log_writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(log_writer)
        .init();

    let cli = Cli::parse();
    let paths = AppPaths::from_system().context("Could not resolve the config and cache directories")?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.settings_file());
    let config = AppConfig::load_or_default(&config_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    match cli.command {
        Commands::Key { value } => save_key(&paths, &value).await,
        Commands::Shell => {
            let deps = build_deps(config, &paths)?;
            run_shell(deps, cli.api_key).await
        }
        Commands::Search { query, hd, pages, copy } => {
            let deps = build_deps(config, &paths)?;
            run_search(deps, cli.api_key, query, QualityMode::from_hd(hd), pages, copy).await
        }
    }
}

async fn save_key(paths: &AppPaths, value: &str) -> Result<()> {
    let store = JsonFileStore::new(paths.store_file());
    store
        .set(API_KEY_ENTRY, value)
        .await
        .context("Failed to save the API key")?;
    info!("API key saved to {}", paths.store_file().display());
    Ok(())
}

fn build_deps(config: AppConfig, paths: &AppPaths) -> Result<SessionDeps> {
    let provider = GiphyClient::from_config(&config.search).context("Failed to set up the Giphy client")?;
    let scratch_path = paths.scratch_file(&config.clipboard.scratch_file_name);
    Ok(SessionDeps {
        config,
        provider: Arc::new(provider),
        clipboard: Arc::new(DefaultClipboard::new()),
        store: Arc::new(JsonFileStore::new(paths.store_file())),
        scratch_path,
    })
}

async fn start_session(
    deps: SessionDeps,
    api_key: Option<String>,
) -> Result<(Sender<SessionCommand>, Receiver<SessionEvent>)> {
    let (tx, rx) = mpsc::channel(100);
    let (cmd_tx, cmd_rx) = mpsc::channel(32);

    tokio::spawn(async move {
        if let Err(e) = run_session(deps, cmd_rx, tx.clone()).await {
            let _ = tx.send(SessionEvent::Error(e.to_string())).await;
        }
    });

    if let Some(key) = api_key {
        cmd_tx.send(SessionCommand::SetApiKey(key)).await?;
    }
    Ok((cmd_tx, rx))
}

async fn run_shell(deps: SessionDeps, api_key: Option<String>) -> Result<()> {
    let (cmd_tx, mut rx) = start_session(deps, api_key).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(ShellInput::Help)) => println!("{}", HELP),
                    Ok(Some(ShellInput::Quit)) => break,
                    Ok(Some(ShellInput::Command(cmd))) => cmd_tx.send(cmd).await?,
                    Err(msg) => println!("{}", msg),
                }
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let SessionEvent::Error(msg) = &event {
                    error!("{}", msg);
                }
                if let Some(text) = format_event(&event) {
                    println!("{}", text);
                }
            }
        }
    }

    let _ = cmd_tx.send(SessionCommand::Shutdown).await;
    Ok(())
}

async fn run_search(
    deps: SessionDeps,
    api_key: Option<String>,
    query: String,
    quality: QualityMode,
    pages: u32,
    copy: Option<usize>,
) -> Result<()> {
    let (cmd_tx, mut rx) = start_session(deps, api_key).await?;

    if quality != QualityMode::default() {
        cmd_tx.send(SessionCommand::SetQuality(quality)).await?;
        wait_for_reset(&mut rx).await?;
    }
    cmd_tx.send(SessionCommand::SetQuery(query)).await?;
    let mut gifs = next_results(&mut rx).await?;

    for _ in 1..pages {
        if gifs.is_empty() {
            break;
        }
        cmd_tx.send(SessionCommand::LoadMore).await?;
        gifs = next_results(&mut rx).await?;
    }
    println!("{}", format_results(&gifs));

    if let Some(n) = copy {
        ensure!(
            (1..=gifs.len()).contains(&n),
            "--copy must be between 1 and {}",
            gifs.len()
        );
        cmd_tx.send(SessionCommand::Select(n - 1)).await?;
        cmd_tx.send(SessionCommand::Copy).await?;
        wait_for_copy(&mut rx).await?;
        println!("copied #{} to the clipboard", n);
    }

    let _ = cmd_tx.send(SessionCommand::Shutdown).await;
    Ok(())
}

/// Consumes the reset a quality switch triggers, up to and including its
/// empty result snapshot, so it is not mistaken for search results.
async fn wait_for_reset(rx: &mut Receiver<SessionEvent>) -> Result<()> {
    tokio::time::timeout(WAIT_LIMIT, async {
        let mut reset = false;
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::QueryReset { .. } => reset = true,
                SessionEvent::Results { .. } if reset => return Ok(()),
                _ => {}
            }
        }
        bail!("session ended before the quality switch")
    })
    .await
    .context("Timed out waiting for the quality switch")?
}

/// Waits for the next result snapshot. An error logged by the session in the
/// meantime means the search failed.
async fn next_results(rx: &mut Receiver<SessionEvent>) -> Result<Vec<GifRef>> {
    tokio::time::timeout(WAIT_LIMIT, async {
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Results { gifs, .. } => return Ok(gifs),
                SessionEvent::Log { level: LogLevel::Error, message } | SessionEvent::Error(message) => {
                    bail!("{}", message)
                }
                _ => {}
            }
        }
        bail!("session ended before results arrived")
    })
    .await
    .context("Timed out waiting for search results")?
}

async fn wait_for_copy(rx: &mut Receiver<SessionEvent>) -> Result<()> {
    tokio::time::timeout(WAIT_LIMIT, async {
        let mut last_error = None;
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Copy(CopyPhase::Confirmed) => return Ok(()),
                SessionEvent::Copy(CopyPhase::Failed) => {
                    bail!("{}", last_error.unwrap_or_else(|| "copy failed".to_string()))
                }
                SessionEvent::Log { level: LogLevel::Error, message } => last_error = Some(message),
                _ => {}
            }
        }
        bail!("session ended before the copy finished")
    })
    .await
    .context("Timed out waiting for the copy")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gif(id: &str) -> GifRef {
        GifRef {
            id: id.to_string(),
            title: String::new(),
            url: format!("https://m/{}.gif", id),
        }
    }

    #[tokio::test]
    async fn reset_snapshot_is_not_taken_for_results() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(SessionEvent::Log {
            level: LogLevel::Info,
            message: "Quality set to Hd; starting over.".into(),
        })
        .await
        .unwrap();
        tx.send(SessionEvent::QueryReset { quality: QualityMode::Hd })
            .await
            .unwrap();
        tx.send(SessionEvent::Results { gifs: Vec::new(), page_cursor: 0 })
            .await
            .unwrap();
        tx.send(SessionEvent::Selection(None)).await.unwrap();
        tx.send(SessionEvent::Results { gifs: vec![gif("cat-0")], page_cursor: 0 })
            .await
            .unwrap();

        wait_for_reset(&mut rx).await.unwrap();
        let gifs = next_results(&mut rx).await.unwrap();
        assert_eq!(gifs, vec![gif("cat-0")]);
    }

    #[tokio::test]
    async fn search_error_ends_the_wait() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(SessionEvent::Log {
            level: LogLevel::Error,
            message: "Search for \"cat\" failed".into(),
        })
        .await
        .unwrap();

        let err = next_results(&mut rx).await.unwrap_err();
        assert!(err.to_string().contains("failed"));
    }
}
