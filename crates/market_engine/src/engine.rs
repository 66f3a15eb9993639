use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use market_core::{ModuleRecord, RecordStore};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::chromium::ChromiumFactory;
use crate::controller::{lock_store, run_search, ChannelEventSink, SearchContext, SearchOutcome};
use crate::settings::EngineSettings;
use crate::surface::SurfaceFactory;
use crate::types::{SearchError, SearchEvent, SearchId, SearchRequest};

enum EngineCommand {
    Start { search_id: SearchId },
    Stop { search_id: SearchId },
    Retry { search_id: SearchId },
}

struct SearchEntry {
    request: SearchRequest,
    /// Bumped on every retry; a task only settles the entry of its own run.
    generation: u64,
    cancel: CancellationToken,
    store: Arc<Mutex<RecordStore>>,
    running: bool,
}

type Registry = Arc<Mutex<HashMap<SearchId, SearchEntry>>>;

fn lock_registry(registry: &Mutex<HashMap<SearchId, SearchEntry>>) -> MutexGuard<'_, HashMap<SearchId, SearchEntry>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
struct Shared {
    settings: Arc<EngineSettings>,
    factory: Arc<dyn SurfaceFactory>,
    registry: Registry,
    event_tx: mpsc::Sender<SearchEvent>,
}

/// Runs searches as independent tasks on a background runtime.
///
/// Commands are fire-and-forget; outcomes arrive as [`SearchEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<SearchEvent>,
    registry: Registry,
    next_id: AtomicU64,
}

impl EngineHandle {
    /// Engine backed by a locally installed Chrome/Chromium.
    pub fn new(settings: EngineSettings) -> Self {
        let factory = Arc::new(ChromiumFactory::new(
            settings.headless,
            settings.navigation_timeout(),
        ));
        Self::with_factory(settings, factory)
    }

    pub fn with_factory(settings: EngineSettings, factory: Arc<dyn SurfaceFactory>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let registry: Registry = Arc::new(Mutex::new(HashMap::new()));
        let shared = Shared {
            settings: Arc::new(settings),
            factory,
            registry: registry.clone(),
            event_tx,
        };

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start search runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &shared, command);
            }
            engine_debug!("Engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx,
            registry,
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a search and starts it asynchronously.
    pub fn start(&self, request: SearchRequest) -> SearchId {
        let search_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        engine_info!("Search {} requested: {:?}", search_id, request);
        lock_registry(&self.registry).insert(
            search_id,
            SearchEntry {
                request,
                generation: 0,
                cancel: CancellationToken::new(),
                store: Arc::new(Mutex::new(RecordStore::new())),
                running: true,
            },
        );
        let _ = self.cmd_tx.send(EngineCommand::Start { search_id });
        search_id
    }

    /// Cancels a running search. Collected records stay readable through
    /// [`EngineHandle::records`].
    pub fn stop(&self, search_id: SearchId) {
        let _ = self.cmd_tx.send(EngineCommand::Stop { search_id });
    }

    /// Discards collected records and restarts the search from navigation
    /// with its original request, on a fresh page surface.
    pub fn retry(&self, search_id: SearchId) {
        let _ = self.cmd_tx.send(EngineCommand::Retry { search_id });
    }

    pub fn try_recv(&self) -> Option<SearchEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SearchEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// All records collected so far by the search's current run, unfiltered.
    pub fn records(&self, search_id: SearchId) -> Option<Vec<ModuleRecord>> {
        let store = lock_registry(&self.registry)
            .get(&search_id)
            .map(|entry| entry.store.clone())?;
        let records = lock_store(&store).records().to_vec();
        Some(records)
    }

    pub fn request(&self, search_id: SearchId) -> Option<SearchRequest> {
        lock_registry(&self.registry)
            .get(&search_id)
            .map(|entry| entry.request.clone())
    }

    pub fn is_running(&self, search_id: SearchId) -> bool {
        lock_registry(&self.registry)
            .get(&search_id)
            .is_some_and(|entry| entry.running)
    }
}

fn handle_command(runtime: &Runtime, shared: &Shared, command: EngineCommand) {
    match command {
        EngineCommand::Start { search_id } => spawn_search(runtime, shared, search_id),
        EngineCommand::Stop { search_id } => {
            let mut registry = lock_registry(&shared.registry);
            match registry.get_mut(&search_id) {
                Some(entry) if entry.running => {
                    entry.running = false;
                    entry.cancel.cancel();
                    engine_info!("Search {} stopped", search_id);
                    let _ = shared.event_tx.send(SearchEvent::Stopped { search_id });
                }
                Some(_) => engine_debug!("Search {} already finished; stop ignored", search_id),
                None => engine_warn!("Stop for unknown search {}", search_id),
            }
        }
        EngineCommand::Retry { search_id } => {
            {
                let mut registry = lock_registry(&shared.registry);
                let Some(entry) = registry.get_mut(&search_id) else {
                    engine_warn!("Retry for unknown search {}", search_id);
                    return;
                };
                entry.cancel.cancel();
                entry.generation += 1;
                entry.cancel = CancellationToken::new();
                entry.store = Arc::new(Mutex::new(RecordStore::new()));
                entry.running = true;
                engine_info!("Search {} retry #{}", search_id, entry.generation);
            }
            spawn_search(runtime, shared, search_id);
        }
    }
}

fn spawn_search(runtime: &Runtime, shared: &Shared, search_id: SearchId) {
    let (ctx, generation) = {
        let registry = lock_registry(&shared.registry);
        let Some(entry) = registry.get(&search_id) else {
            engine_warn!("Start for unknown search {}", search_id);
            return;
        };
        let ctx = SearchContext {
            search_id,
            request: entry.request.clone(),
            settings: shared.settings.clone(),
            store: entry.store.clone(),
            cancel: entry.cancel.clone(),
        };
        (ctx, entry.generation)
    };

    let shared = shared.clone();
    runtime.spawn(async move {
        let sink = ChannelEventSink::new(shared.event_tx.clone());
        // Opening runs to completion so a page created mid-stop is still released.
        let outcome = match shared.factory.open().await {
            Err(err) if ctx.cancel.is_cancelled() => {
                engine_debug!("Search {} cancelled while opening a page: {}", search_id, err);
                SearchOutcome::Cancelled
            }
            Err(err) => {
                let err = SearchError::Runtime(err.to_string());
                engine_warn!("Search {} could not open a page: {}", search_id, err);
                ctx.emit_terminal(&sink, Some(&err));
                SearchOutcome::Failed(err)
            }
            Ok(mut surface) => {
                let outcome = if ctx.cancel.is_cancelled() {
                    SearchOutcome::Cancelled
                } else {
                    run_search(&ctx, surface.as_mut(), &sink).await
                };
                if let Err(err) = surface.close().await {
                    engine_warn!("Search {} page release failed: {}", search_id, err);
                }
                outcome
            }
        };

        let mut registry = lock_registry(&shared.registry);
        if let Some(entry) = registry.get_mut(&search_id) {
            if entry.generation == generation {
                entry.running = false;
            }
        }
        engine_debug!("Search {} run {} settled: {:?}", search_id, generation, outcome);
    });
}
