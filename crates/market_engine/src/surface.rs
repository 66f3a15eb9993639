//! Automated page surface abstraction.
//!
//! The extraction controller only needs to navigate, inject a script and read
//! its JSON result, scroll, and wait. Keeping the capability this narrow lets
//! tests drive the controller with a scripted fake page.

use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("script failed: {0}")]
    Script(String),
    #[error("surface closed")]
    Closed,
}

/// One page (tab) owned by exactly one search.
#[async_trait]
pub trait PageSurface: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError>;

    /// Runs a script in the page and returns its JSON-converted result.
    async fn inject(&mut self, script: &str) -> Result<serde_json::Value, SurfaceError>;

    /// Scrolls to the bottom of the page content.
    async fn scroll(&mut self) -> Result<(), SurfaceError>;

    /// Suspends the calling search only.
    async fn wait(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    /// Releases the page.
    async fn close(self: Box<Self>) -> Result<(), SurfaceError>;
}

/// Hands out a fresh surface per search (and per retry).
#[async_trait]
pub trait SurfaceFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSurface>, SurfaceError>;
}
