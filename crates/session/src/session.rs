use crate::commands::SessionCommand;
use crate::controller::{Applied, QueryController, SearchTicket, Settled};
use crate::events::{CopyPhase, SessionEvent};
use crate::staging::{StagingPipeline, StagingRequest};
use crate::{log_debug, log_error, log_info, log_warn};
use anyhow::Result;
use giffos_clipboard::ClipboardProvider;
use giffos_core::{AppConfig, Credential, CredentialStore, GifRef, GiffosError};
use giffos_provider::GifProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Collaborators the session drives. Built once by the app shell.
pub struct SessionDeps {
    pub config: AppConfig,
    pub provider: Arc<dyn GifProvider>,
    pub clipboard: Arc<dyn ClipboardProvider>,
    pub store: Arc<dyn CredentialStore>,
    pub scratch_path: PathBuf,
}

type SearchOutcome = (SearchTicket, Result<Vec<GifRef>, GiffosError>);

enum CopyProgress {
    Phase(CopyPhase),
    Done(PathBuf),
    Failed(GiffosError),
}

/// Owns all search and copy state until `cmd_rx` closes or `Shutdown`
/// arrives. Network and clipboard work runs on spawned tasks; their results
/// come back here and are applied in the order they settle.
pub async fn run_session(
    deps: SessionDeps,
    mut cmd_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
) -> Result<()> {
    let mut credential = Credential::load(deps.store.clone()).await;
    let _ = event_tx
        .send(SessionEvent::ApiKeyLoaded(credential.value().to_string()))
        .await;
    if credential.value().is_empty() {
        log_warn!(&event_tx, "No API key configured; searches will be rejected by the provider.");
    }

    let mut controller = QueryController::new(&deps.config.search);
    let pipeline = Arc::new(StagingPipeline::new(
        deps.provider.clone(),
        deps.clipboard.clone(),
    ));
    let confirm_for = deps.config.clipboard.confirm();

    let (search_tx, mut search_rx) = mpsc::channel::<SearchOutcome>(16);
    let (copy_tx, mut copy_rx) = mpsc::unbounded_channel::<(u64, CopyProgress)>();
    // Only the newest copy action reports progress; older ones are aborted.
    let mut copy_generation: u64 = 0;
    let mut copy_task: Option<JoinHandle<()>> = None;
    let mut confirm_deadline: Option<Instant> = None;

    log_info!(&event_tx, "Session ready.");

    loop {
        let debounce_at = controller.deadline();

        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    SessionCommand::Shutdown => break,
                    SessionCommand::SetQuery(text) => {
                        controller.edit_query(text, Instant::now());
                    }
                    SessionCommand::SetQuality(mode) => {
                        if controller.set_quality(mode) {
                            log_info!(&event_tx, "Quality set to {:?}; starting over.", mode);
                            let _ = event_tx.send(SessionEvent::QueryReset { quality: mode }).await;
                            emit_results(&event_tx, &controller).await;
                        }
                    }
                    SessionCommand::SetApiKey(key) => {
                        match credential.update(key).await {
                            Ok(false) => continue,
                            Ok(true) => log_info!(&event_tx, "API key saved."),
                            Err(e) => log_error!(&event_tx, "Failed to persist API key: {}", e),
                        }
                        controller.rearm(Instant::now());
                    }
                    SessionCommand::LoadMore => {
                        match controller.load_more(credential.value()) {
                            Some(ticket) => {
                                log_debug!(&event_tx, "Loading more for {:?} at offset {}", ticket.request.query, ticket.request.offset);
                                spawn_search(deps.provider.clone(), ticket, search_tx.clone());
                            }
                            None => log_debug!(&event_tx, "Nothing to load more of."),
                        }
                    }
                    SessionCommand::Select(index) => {
                        if controller.select(index) {
                            let _ = event_tx.send(SessionEvent::Selection(Some(index))).await;
                        } else {
                            log_warn!(&event_tx, "Ignoring selection {} outside {} results.", index, controller.results().len());
                        }
                    }
                    SessionCommand::Copy => {
                        let Some(gif) = controller.selected().cloned() else {
                            log_warn!(&event_tx, "Copy requested with nothing selected.");
                            continue;
                        };
                        if let Some(task) = copy_task.take() {
                            task.abort();
                        }
                        copy_generation += 1;
                        confirm_deadline = None;
                        log_info!(&event_tx, "Copying {} to the clipboard.", gif.url);
                        copy_task = Some(spawn_copy(
                            pipeline.clone(),
                            StagingRequest { source: gif, scratch_path: deps.scratch_path.clone() },
                            copy_generation,
                            copy_tx.clone(),
                        ));
                    }
                    SessionCommand::Resync => {
                        let _ = event_tx
                            .send(SessionEvent::ApiKeyLoaded(credential.value().to_string()))
                            .await;
                        emit_results(&event_tx, &controller).await;
                    }
                }
            }

            _ = sleep_until(debounce_at.unwrap_or_else(Instant::now)), if debounce_at.is_some() => {
                match controller.settle(Instant::now(), credential.value()) {
                    Some(Settled::Cleared) => {
                        log_debug!(&event_tx, "Query is blank; clearing results.");
                        emit_results(&event_tx, &controller).await;
                    }
                    Some(Settled::Search(ticket)) => {
                        log_debug!(&event_tx, "Searching {:?} (generation {})", ticket.request.query, ticket.generation);
                        spawn_search(deps.provider.clone(), ticket, search_tx.clone());
                    }
                    None => {}
                }
            }

            Some((ticket, outcome)) = search_rx.recv() => {
                match controller.apply(&ticket, outcome) {
                    Applied::Replaced | Applied::Appended => {
                        emit_results(&event_tx, &controller).await;
                    }
                    Applied::Stale => {
                        log_debug!(&event_tx, "Dropping stale results for {:?}", ticket.request.query);
                    }
                    Applied::Failed(e) => {
                        log_error!(&event_tx, "Search for {:?} failed: {}", ticket.request.query, e);
                    }
                }
            }

            Some((generation, progress)) = copy_rx.recv() => {
                if generation != copy_generation {
                    continue;
                }
                match progress {
                    CopyProgress::Phase(phase) => {
                        let _ = event_tx.send(SessionEvent::Copy(phase)).await;
                    }
                    CopyProgress::Done(path) => {
                        log_info!(&event_tx, "Copied {} to the clipboard.", path.display());
                        confirm_deadline = Some(Instant::now() + confirm_for);
                        let _ = event_tx.send(SessionEvent::Copy(CopyPhase::Confirmed)).await;
                    }
                    CopyProgress::Failed(e) => {
                        log_error!(&event_tx, "Copy failed: {}", e);
                        let _ = event_tx.send(SessionEvent::Copy(CopyPhase::Failed)).await;
                        let _ = event_tx.send(SessionEvent::Copy(CopyPhase::Idle)).await;
                    }
                }
            }

            _ = sleep_until(confirm_deadline.unwrap_or_else(Instant::now)), if confirm_deadline.is_some() => {
                confirm_deadline = None;
                let _ = event_tx.send(SessionEvent::Copy(CopyPhase::Idle)).await;
            }
        }
    }

    log_info!(&event_tx, "Session closed.");
    Ok(())
}

/// Snapshot of the result set followed by the selection, which may have
/// been reset along with it.
async fn emit_results(event_tx: &Sender<SessionEvent>, controller: &QueryController) {
    let results = controller.results();
    let _ = event_tx
        .send(SessionEvent::Results {
            gifs: results.gifs().to_vec(),
            page_cursor: results.page_cursor(),
        })
        .await;
    let _ = event_tx
        .send(SessionEvent::Selection(controller.selection()))
        .await;
}

fn spawn_search(provider: Arc<dyn GifProvider>, ticket: SearchTicket, tx: Sender<SearchOutcome>) {
    tokio::spawn(async move {
        let outcome = provider.search(&ticket.request).await;
        let _ = tx.send((ticket, outcome)).await;
    });
}

fn spawn_copy(
    pipeline: Arc<StagingPipeline>,
    request: StagingRequest,
    generation: u64,
    tx: UnboundedSender<(u64, CopyProgress)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let phase_tx = tx.clone();
        let result = pipeline
            .run(request, |phase| {
                let _ = phase_tx.send((generation, CopyProgress::Phase(phase)));
            })
            .await;
        let progress = match result {
            Ok(path) => CopyProgress::Done(path),
            Err(e) => CopyProgress::Failed(e),
        };
        let _ = tx.send((generation, progress));
    })
}
