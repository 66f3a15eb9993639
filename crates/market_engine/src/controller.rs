//! Extraction controller: setup sequence, then the poll/scroll/parse loop of
//! one search.
//!
//! The loop is strictly sequential. Every suspension point (navigation, each
//! injected script, settle and inter-poll waits, scrolling) races the search's
//! cancellation token, so a stop never waits for a pending delay to elapse.

use std::future::Future;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_debug, engine_info, engine_warn};
use market_core::{ModuleRecord, PollDecision, PollObservation, PollTracker, RecordStore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::extract::ListingExtractor;
use crate::scripts::{self, ParsePass};
use crate::settings::EngineSettings;
use crate::surface::PageSurface;
use crate::types::{SearchError, SearchEvent, SearchId, SearchRequest, SearchSnapshot, SearchStage};

/// Receives the events of running searches.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SearchEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<SearchEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<SearchEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SearchEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) fn lock_store(store: &Mutex<RecordStore>) -> MutexGuard<'_, RecordStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything one run of a search needs besides its page surface.
#[derive(Clone)]
pub struct SearchContext {
    pub search_id: SearchId,
    pub request: SearchRequest,
    pub settings: Arc<EngineSettings>,
    pub store: Arc<Mutex<RecordStore>>,
    pub cancel: CancellationToken,
}

impl SearchContext {
    pub fn new(search_id: SearchId, request: SearchRequest, settings: Arc<EngineSettings>) -> Self {
        Self {
            search_id,
            request,
            settings,
            store: Arc::new(Mutex::new(RecordStore::new())),
            cancel: CancellationToken::new(),
        }
    }

    /// Stored records filtered by the search's name query.
    pub fn filtered_records(&self) -> Vec<ModuleRecord> {
        lock_store(&self.store).snapshot(Some(self.request.module_name.as_str()))
    }

    /// Emits the terminal snapshot: the filtered record set, `finished`, and
    /// the error classification when the search failed.
    pub(crate) fn emit_terminal(&self, sink: &dyn EventSink, error: Option<&SearchError>) {
        if self.cancel.is_cancelled() {
            return;
        }
        sink.emit(SearchEvent::Snapshot(SearchSnapshot {
            search_id: self.search_id,
            records: self.filtered_records(),
            finished: true,
            error: error.map(SearchError::classification),
        }));
    }
}

/// How a search run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Final snapshot emitted without error.
    Completed(PollDecision),
    /// Terminal error snapshot emitted.
    Failed(SearchError),
    /// Stopped or superseded by a retry; nothing further emitted.
    Cancelled,
}

enum Halt {
    Cancelled,
    Failed(SearchError),
}

impl From<SearchError> for Halt {
    fn from(err: SearchError) -> Self {
        Halt::Failed(err)
    }
}

struct Controller<'a> {
    ctx: &'a SearchContext,
    sink: &'a dyn EventSink,
    extractor: ListingExtractor,
}

impl Controller<'_> {
    async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Halt> {
        tokio::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => Err(Halt::Cancelled),
            out = fut => Ok(out),
        }
    }

    fn emit(&self, event: SearchEvent) {
        if !self.ctx.cancel.is_cancelled() {
            self.sink.emit(event);
        }
    }

    fn progress(&self, stage: SearchStage) {
        engine_debug!("Search {} stage {}", self.ctx.search_id, stage);
        self.emit(SearchEvent::Progress {
            search_id: self.ctx.search_id,
            stage,
        });
    }

    async fn setup_step(
        &self,
        surface: &mut dyn PageSurface,
        step: u8,
        label: &str,
        script: String,
    ) -> Result<(), Halt> {
        let id = self.ctx.search_id;
        match self.guard(surface.inject(&script)).await? {
            Ok(serde_json::Value::Bool(false)) => {
                engine_warn!("Search {} setup {} ({}) matched nothing; continuing", id, step, label)
            }
            Ok(_) => engine_info!("Search {} setup {} ({}) applied", id, step, label),
            Err(err) => {
                engine_warn!("Search {} setup {} ({}) failed: {}; continuing", id, step, label, err)
            }
        }
        self.guard(surface.wait(self.ctx.settings.settle_delay())).await
    }

    async fn setup(&self, surface: &mut dyn PageSurface) -> Result<(), Halt> {
        let selectors = &self.ctx.settings.selectors;
        let request = &self.ctx.request;

        let script = scripts::select_category(selectors, &request.module_type);
        self.setup_step(surface, 1, "category", script).await?;

        self.progress(SearchStage::EnterName);
        let script = scripts::enter_name(selectors, &request.module_name);
        self.setup_step(surface, 2, "name", script).await?;

        self.progress(SearchStage::SetPlatform);
        let script = scripts::select_platform(selectors, &request.platform);
        self.setup_step(surface, 3, "platform", script).await?;

        self.progress(SearchStage::Waiting);
        Ok(())
    }

    async fn poll_loop(&self, surface: &mut dyn PageSurface) -> Result<PollDecision, Halt> {
        let id = self.ctx.search_id;
        let settings = &self.ctx.settings;
        let policy = settings.poll_policy();
        let parse_script = scripts::parse_pass(&settings.selectors);
        let mut tracker = PollTracker::new(policy);
        let started = Instant::now();

        loop {
            let value = self
                .guard(surface.inject(&parse_script))
                .await?
                .map_err(|err| SearchError::ParseFailure(err.to_string()))?;
            let pass = ParsePass::from_value(value)
                .map_err(|err| SearchError::ParseFailure(err.to_string()))?;

            let records = self.extractor.extract_all(&pass.listings);
            let (added, collected) = {
                let mut store = lock_store(&self.ctx.store);
                let added = store.extend(records);
                (added, store.len())
            };
            self.emit(SearchEvent::Snapshot(SearchSnapshot {
                search_id: id,
                records: self.ctx.filtered_records(),
                finished: false,
                error: None,
            }));

            let decision = tracker.observe(PollObservation {
                visible_count: pass.visible_count,
                loader_visible: pass.loader_visible,
                collected,
                elapsed: started.elapsed(),
            });
            engine_debug!(
                "Search {} poll {}: visible={} loader={} new={} collected={} stable={} -> {:?}",
                id,
                tracker.polls(),
                pass.visible_count,
                pass.loader_visible,
                added,
                collected,
                tracker.stable_count(),
                decision
            );

            match decision {
                PollDecision::Continue => {}
                PollDecision::Stable | PollDecision::IterationCap => return Ok(decision),
                PollDecision::ZeroResultTimeout => {
                    return Err(SearchError::ZeroResultTimeout(policy.zero_result_timeout).into())
                }
            }

            self.guard(surface.scroll())
                .await?
                .map_err(|err| SearchError::Runtime(err.to_string()))?;
            self.guard(surface.wait(settings.poll_interval())).await?;
        }
    }

    async fn drive(&self, surface: &mut dyn PageSurface) -> Result<PollDecision, Halt> {
        let url = url::Url::parse(&self.ctx.settings.market_url).map_err(|err| {
            SearchError::NavigationFailure(format!("invalid market url: {err}"))
        })?;
        engine_info!("Search {} navigating to {}", self.ctx.search_id, url);
        self.guard(surface.navigate(url.as_str()))
            .await?
            .map_err(|err| SearchError::NavigationFailure(err.to_string()))?;

        self.setup(surface).await?;
        self.poll_loop(surface).await
    }
}

/// Runs one search to completion on `surface`. The caller owns the surface
/// and releases it afterwards, whatever the outcome.
pub async fn run_search(
    ctx: &SearchContext,
    surface: &mut dyn PageSurface,
    sink: &dyn EventSink,
) -> SearchOutcome {
    let controller = Controller {
        ctx,
        sink,
        extractor: ListingExtractor::new(&ctx.settings.selectors),
    };

    match controller.drive(surface).await {
        Ok(decision) => {
            engine_info!(
                "Search {} finished ({:?}) with {} records",
                ctx.search_id,
                decision,
                lock_store(&ctx.store).len()
            );
            ctx.emit_terminal(sink, None);
            SearchOutcome::Completed(decision)
        }
        Err(Halt::Failed(err)) => {
            engine_warn!("Search {} failed: {}", ctx.search_id, err);
            ctx.emit_terminal(sink, Some(&err));
            SearchOutcome::Failed(err)
        }
        Err(Halt::Cancelled) => {
            engine_info!("Search {} cancelled", ctx.search_id);
            SearchOutcome::Cancelled
        }
    }
}
