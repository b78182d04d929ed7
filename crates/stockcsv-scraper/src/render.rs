//! Narrow capability interface over headless page rendering.
//!
//! The resolver only needs two things from a browser: the fully rendered
//! HTML and the URLs of network requests observed while the page loaded.
//! Hiding that behind a trait keeps the core free of any browser-automation
//! dependency and lets tests substitute a canned renderer.

use async_trait::async_trait;

use crate::error::ScrapeError;

/// Output of one headless render pass.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Serialized DOM after scripts ran.
    pub html: String,
    /// URLs of every network request issued while the page loaded, in
    /// observation order.
    pub observed_requests: Vec<String>,
}

/// A renderer owns its browser session for the duration of one call and
/// must release it on every exit path, success or failure.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url` in a real browser engine and reports the final DOM
    /// plus sniffed network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Render`] when the browser cannot be launched
    /// or the page does not load within the renderer's timeout.
    async fn render_and_sniff(&self, url: &str) -> Result<RenderedPage, ScrapeError>;
}
