//! Chromium-backed renderer for widget pages that only reveal their
//! identifier after scripts run.
//!
//! Each call launches a fresh headless browser, loads the page while a CDP
//! network listener records every outgoing request URL, gives scripts a
//! moment to settle (dismissing cookie-consent overlays that would block
//! the widget), and returns the serialized DOM plus the sniffed URLs. The
//! browser and its spawned tasks are torn down on every exit path.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::EventRequestWillBeSent;
use futures::StreamExt;

use crate::error::ScrapeError;
use crate::render::{PageRenderer, RenderedPage};

/// Grace period after navigation for the widget to boot and fire its API
/// calls.
const SETTLE_MS: u64 = 2_500;

/// Clicks through the common consent-manager overlays so the locator
/// widget underneath actually initializes.
const DISMISS_CONSENT_JS: &str = r#"
(() => {
    const selectors = [
        '#onetrust-accept-btn-handler',
        '#didomi-notice-agree-button',
        'button[aria-label="Accept cookies"]',
        '.cc-allow',
    ];
    for (const sel of selectors) {
        const el = document.querySelector(sel);
        if (el) { el.click(); return sel; }
    }
    const labels = ['accept all', 'accept cookies', 'i agree', 'agree'];
    for (const btn of document.querySelectorAll('button')) {
        const text = (btn.textContent || '').trim().toLowerCase();
        if (labels.includes(text)) { btn.click(); return text; }
    }
    return null;
})()
"#;

pub struct ChromiumRenderer {
    render_timeout: Duration,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(render_timeout_secs: u64) -> Self {
        Self {
            render_timeout: Duration::from_secs(render_timeout_secs),
        }
    }

    async fn render_inner(
        browser: &Browser,
        url: &str,
    ) -> Result<(String, Arc<Mutex<Vec<String>>>), ScrapeError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to open page: {e}")))?;

        let observed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let mut events = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to attach network listener: {e}")))?;
        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Ok(mut urls) = sink.lock() {
                    urls.push(event.request.url.clone());
                }
            }
        });

        let result = async {
            page.goto(url)
                .await
                .map_err(|e| ScrapeError::Render(format!("navigation failed: {e}")))?;
            if let Err(e) = page.wait_for_navigation().await {
                tracing::debug!(url, error = %e, "wait_for_navigation did not settle");
            }

            match page.evaluate(DISMISS_CONSENT_JS).await {
                Ok(hit) => {
                    if let Some(sel) = hit.value().and_then(serde_json::Value::as_str) {
                        tracing::debug!(url, selector = sel, "dismissed consent overlay");
                    }
                }
                Err(e) => tracing::debug!(url, error = %e, "consent dismissal script failed"),
            }
            tokio::time::sleep(Duration::from_millis(SETTLE_MS)).await;

            page.content()
                .await
                .map_err(|e| ScrapeError::Render(format!("failed to read page content: {e}")))
        }
        .await;

        listener.abort();
        let _ = page.close().await;
        result.map(|html| (html, observed))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render_and_sniff(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let config = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .build()
            .map_err(ScrapeError::Render)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to launch browser: {e}")))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let rendered = tokio::time::timeout(
            self.render_timeout,
            Self::render_inner(&browser, url),
        )
        .await;

        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        let _ = browser.wait().await;
        handler_task.abort();

        let (html, observed) = match rendered {
            Ok(inner) => inner?,
            Err(_) => {
                return Err(ScrapeError::Render(format!(
                    "page did not render within {}s",
                    self.render_timeout.as_secs()
                )));
            }
        };

        let observed_requests = observed
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default();
        tracing::debug!(
            url,
            requests = observed_requests.len(),
            "headless render complete"
        );
        Ok(RenderedPage {
            html,
            observed_requests,
        })
    }
}
