#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use market_engine::{
    EventSink, PageSurface, SearchEvent, SearchSnapshot, SearchStage, SurfaceError, SurfaceFactory,
};
use serde_json::{json, Value};

/// What a [`ScriptedPage`] was asked to do.
#[derive(Debug, Default)]
pub struct PageLog {
    pub navigations: Vec<String>,
    pub setup_scripts: Vec<String>,
    pub polls: usize,
    pub scrolls: usize,
    pub closed: bool,
}

/// Fake page that answers parse passes from a script. Once the script runs
/// out, the last answer repeats.
pub struct ScriptedPage {
    passes: VecDeque<Result<Value, SurfaceError>>,
    last: Option<Value>,
    navigate_error: Option<SurfaceError>,
    log: Arc<Mutex<PageLog>>,
}

impl ScriptedPage {
    pub fn new(passes: Vec<Result<Value, SurfaceError>>) -> Self {
        Self {
            passes: passes.into(),
            last: None,
            navigate_error: None,
            log: Arc::new(Mutex::new(PageLog::default())),
        }
    }

    pub fn failing_navigation(error: SurfaceError) -> Self {
        let mut page = Self::new(Vec::new());
        page.navigate_error = Some(error);
        page
    }

    pub fn log(&self) -> Arc<Mutex<PageLog>> {
        self.log.clone()
    }
}

#[async_trait]
impl PageSurface for ScriptedPage {
    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        match self.navigate_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn inject(&mut self, script: &str) -> Result<Value, SurfaceError> {
        if !script.contains("visibleCount") {
            self.log.lock().unwrap().setup_scripts.push(script.to_string());
            return Ok(Value::Bool(true));
        }
        self.log.lock().unwrap().polls += 1;
        match self.passes.pop_front() {
            Some(Ok(value)) => {
                self.last = Some(value.clone());
                Ok(value)
            }
            Some(Err(err)) => Err(err),
            None => self
                .last
                .clone()
                .ok_or_else(|| SurfaceError::Script("no scripted pass".to_string())),
        }
    }

    async fn scroll(&mut self) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), SurfaceError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out prepared pages in order, then reports the browser unavailable.
#[derive(Default)]
pub struct ScriptedFactory {
    pages: Mutex<VecDeque<ScriptedPage>>,
    opened: AtomicUsize,
    open_delay: Duration,
}

impl ScriptedFactory {
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            opened: AtomicUsize::new(0),
            open_delay: Duration::ZERO,
        }
    }

    /// Opening a page takes `delay`, like a browser creating a tab.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SurfaceFactory for ScriptedFactory {
    async fn open(&self) -> Result<Box<dyn PageSurface>, SurfaceError> {
        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }
        let page = self.pages.lock().unwrap().pop_front();
        match page {
            Some(page) => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(page))
            }
            None => Err(SurfaceError::Unavailable("no page left".to_string())),
        }
    }
}

#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn snapshots(&self) -> Vec<SearchSnapshot> {
        snapshots(&self.events())
    }

    pub fn stages(&self) -> Vec<SearchStage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SearchEvent::Progress { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: SearchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn snapshots(events: &[SearchEvent]) -> Vec<SearchSnapshot> {
    events
        .iter()
        .filter_map(|event| match event {
            SearchEvent::Snapshot(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .collect()
}

pub fn listing(name: &str, price: &str, seller: &str) -> String {
    format!(
        r#"<div class="market-item" data-module-type="ancestor"><span class="item-name">{name}</span><span class="item-category">Ancestor</span><span class="item-price">{price} Caliber</span><div class="seller"><span class="seller-name">{seller}</span><span class="seller-status">Online</span></div></div>"#
    )
}

/// `count` distinct listings named `Module 1..=count`.
pub fn listings(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| listing(&format!("Module {i}"), &format!("{}", i * 100), "Seller"))
        .collect()
}

pub fn pass(listings: Vec<String>, visible_count: usize, loader_visible: bool) -> Value {
    json!({
        "listings": listings,
        "visibleCount": visible_count,
        "loaderVisible": loader_visible,
    })
}

pub fn ok_pass(listings: Vec<String>, visible_count: usize, loader_visible: bool) -> Result<Value, SurfaceError> {
    Ok(pass(listings, visible_count, loader_visible))
}

pub fn fast_settings() -> market_engine::EngineSettings {
    market_engine::EngineSettings {
        settle_delay_ms: 1,
        poll_interval_ms: 5,
        ..market_engine::EngineSettings::default()
    }
}

pub fn wait_for<F>(engine: &market_engine::EngineHandle, timeout: Duration, mut done: F) -> Vec<SearchEvent>
where
    F: FnMut(&SearchEvent) -> bool,
{
    let deadline = std::time::Instant::now() + timeout;
    let mut events = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(std::time::Instant::now()) {
        let Some(event) = engine.recv_timeout(remaining) else {
            break;
        };
        let finished = done(&event);
        events.push(event);
        if finished {
            break;
        }
    }
    events
}
