//! Headless-browser page fetching over the Chrome DevTools Protocol.
//!
//! [`ChromiumFetcher`] launches a fresh, isolated browser for every fetch and
//! always tears it down afterwards, whether the fetch succeeded or not.
//! Navigation waits for `DOMContentLoaded`, not network idle, so late
//! script-injected prices can be missed in exchange for a bounded latency.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Upper bound on waiting for the browser process to exit after close.
const BROWSER_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves once the static document is parsed.
const WAIT_FOR_DOM_READY: &str = r"
    new Promise((resolve) => {
        if (document.readyState === 'interactive' || document.readyState === 'complete') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
";

/// Source of rendered page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigates to `url` and returns the rendered document HTML.
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary. `None` lets chromiumoxide search the usual
    /// install locations.
    pub executable: Option<PathBuf>,
    /// Upper bound on navigation plus DOM-ready wait.
    pub nav_timeout: Duration,
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            nav_timeout: Duration::from_secs(30),
            headless: true,
        }
    }
}

pub struct ChromiumFetcher {
    settings: BrowserSettings,
}

impl ChromiumFetcher {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        let mut builder = BrowserConfig::builder();
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }
        if !self.settings.headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        let config = builder.build().map_err(ScrapeError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<String, ScrapeError> {
        let browser_err = |e: chromiumoxide::error::CdpError| ScrapeError::Browser {
            url: url.to_owned(),
            reason: e.to_string(),
        };

        let page = browser.new_page("about:blank").await.map_err(browser_err)?;
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT))
            .await
            .map_err(browser_err)?;

        let timeout = self.settings.nav_timeout;
        match tokio::time::timeout(timeout, navigate(&page, url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScrapeError::NavigationTimeout {
                    url: url.to_owned(),
                    timeout_secs: timeout.as_secs(),
                })
            }
        }

        let html = page.content().await.map_err(browser_err)?;
        if let Err(e) = page.close().await {
            tracing::debug!(url, error = %e, "failed to close page");
        }
        Ok(html)
    }
}

/// Navigates and waits for DOM ready. A navigation Chrome itself rejects
/// (DNS, refused connection, TLS) comes back as `error_text` on an otherwise
/// successful command and is turned into an error here.
async fn navigate(page: &Page, url: &str) -> Result<(), ScrapeError> {
    let browser_err = |e: chromiumoxide::error::CdpError| ScrapeError::Browser {
        url: url.to_owned(),
        reason: e.to_string(),
    };

    let response = page
        .execute(NavigateParams::new(url))
        .await
        .map_err(browser_err)?;
    if let Some(err) = navigation_error(url, response.result.error_text.as_deref()) {
        return Err(err);
    }

    let state = page.evaluate(WAIT_FOR_DOM_READY).await.map_err(browser_err)?;
    tracing::debug!(
        url,
        ready_state = ?state.into_value::<String>().ok(),
        "document ready"
    );
    Ok(())
}

fn navigation_error(url: &str, error_text: Option<&str>) -> Option<ScrapeError> {
    error_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| ScrapeError::Browser {
            url: url.to_owned(),
            reason: text.to_owned(),
        })
}

/// Closes the browser, killing the process if it will not close or exit.
async fn shutdown(mut browser: Browser, url: &str) {
    if let Err(e) = browser.close().await {
        tracing::debug!(url, error = %e, "browser close failed; killing process");
        kill(&mut browser, url).await;
    }
    if !exited_within(browser.wait(), BROWSER_EXIT_TIMEOUT, url).await {
        tracing::warn!(url, "browser did not exit in time; killing process");
        kill(&mut browser, url).await;
    }
}

/// `false` only if `exit` is still pending after `limit`.
async fn exited_within<T, E: std::fmt::Display>(
    exit: impl Future<Output = Result<T, E>>,
    limit: Duration,
    url: &str,
) -> bool {
    match tokio::time::timeout(limit, exit).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!(url, error = %e, "browser wait failed");
            true
        }
        Err(_) => false,
    }
}

async fn kill(browser: &mut Browser, url: &str) {
    if let Some(Err(e)) = browser.kill().await {
        tracing::warn!(url, error = %e, "failed to kill browser process");
    }
}

#[async_trait]
impl PageFetcher for ChromiumFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let (browser, handler_task) = self.launch().await?;
        tracing::debug!(url, "browser session launched");

        let result = self.render(&browser, url).await;

        shutdown(browser, url).await;
        handler_task.abort();

        result
    }
}
