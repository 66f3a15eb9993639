//! Chromium-backed page surface using chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use tokio::sync::OnceCell;

use crate::scripts;
use crate::surface::{PageSurface, SurfaceError, SurfaceFactory};

/// Locates a Chrome/Chromium binary: `MARKET_CHROME_PATH` first, then `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MARKET_CHROME_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    for candidate in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(candidate) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one shared browser on first use and opens a new tab per search.
pub struct ChromiumFactory {
    headless: bool,
    navigation_timeout: Duration,
    browser: OnceCell<Browser>,
}

impl ChromiumFactory {
    pub fn new(headless: bool, navigation_timeout: Duration) -> Self {
        Self {
            headless,
            navigation_timeout,
            browser: OnceCell::new(),
        }
    }

    async fn launch(&self) -> Result<Browser, SurfaceError> {
        let executable = find_chromium().ok_or_else(|| {
            SurfaceError::Unavailable("no Chrome/Chromium binary found".to_string())
        })?;
        engine_info!("Launching browser {:?} headless={}", executable, self.headless);

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(SurfaceError::Unavailable)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| SurfaceError::Unavailable(err.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    engine_debug!("Browser handler event error: {}", err);
                }
            }
        });

        Ok(browser)
    }
}

#[async_trait]
impl SurfaceFactory for ChromiumFactory {
    async fn open(&self) -> Result<Box<dyn PageSurface>, SurfaceError> {
        let browser = self.browser.get_or_try_init(|| self.launch()).await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| SurfaceError::Unavailable(err.to_string()))?;
        Ok(Box::new(ChromiumSurface {
            page,
            navigation_timeout: self.navigation_timeout,
        }))
    }
}

/// One browser tab.
pub struct ChromiumSurface {
    page: Page,
    navigation_timeout: Duration,
}

#[async_trait]
impl PageSurface for ChromiumSurface {
    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        let result = tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await;
        match result {
            Ok(Ok(_)) => {
                if let Err(err) = self.page.wait_for_navigation().await {
                    engine_warn!("wait_for_navigation after {} failed: {}", url, err);
                }
                Ok(())
            }
            Ok(Err(err)) => Err(SurfaceError::Navigation(err.to_string())),
            Err(_) => Err(SurfaceError::Navigation(format!(
                "timed out after {:?}",
                self.navigation_timeout
            ))),
        }
    }

    async fn inject(&mut self, script: &str) -> Result<serde_json::Value, SurfaceError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|err| SurfaceError::Script(err.to_string()))?;
        result
            .into_value()
            .map_err(|err| SurfaceError::Script(format!("result conversion: {err:?}")))
    }

    async fn scroll(&mut self) -> Result<(), SurfaceError> {
        self.inject(scripts::SCROLL_TO_BOTTOM).await.map(|_| ())
    }

    async fn close(self: Box<Self>) -> Result<(), SurfaceError> {
        self.page
            .close()
            .await
            .map_err(|err| SurfaceError::Script(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chrome or Chromium to be installed
    async fn chromium_surface_navigates_and_injects() {
        let factory = ChromiumFactory::new(true, Duration::from_secs(10));
        let mut surface = factory.open().await.expect("open surface");
        surface
            .navigate("data:text/html,<h1>Hello</h1>")
            .await
            .expect("navigate");
        let value = surface
            .inject("document.querySelector('h1').textContent")
            .await
            .expect("inject");
        assert_eq!(value.as_str(), Some("Hello"));
        surface.scroll().await.expect("scroll");
        surface.close().await.expect("close");
    }
}
