//! Store-identifier resolution.
//!
//! Given a locator page URL (or a bare numeric store ID), determine which
//! Stockist account serves its location data. Strategies run in increasing
//! cost order and stop at the first hit:
//!
//! 1. bare numeric input — no network I/O at all;
//! 2. static HTML scan — one GET, then a regex pattern chain over
//!    data-attributes, inline script assignments, and embed URLs;
//! 3. headless render (when a renderer is available) — sniffed network
//!    requests first, then the rendered DOM.

use regex::Regex;

use crate::error::ScrapeError;
use crate::fetch;
use crate::render::PageRenderer;
use crate::types::{Identifier, ResolvedStore, ScrapeConfig};

/// Resolves a store identifier from user input.
///
/// `STOCKCSV_ACCOUNT_OVERRIDE` (threaded through
/// [`ScrapeConfig::account_override`]) bypasses every strategy.
///
/// # Errors
///
/// Returns [`ScrapeError::Resolution`] when no strategy yields an
/// identifier. Per-strategy fetch and render failures are logged and
/// absorbed; they never abort the chain on their own.
pub async fn resolve(
    input: &str,
    config: &ScrapeConfig,
    client: &reqwest::Client,
    renderer: Option<&dyn PageRenderer>,
) -> Result<ResolvedStore, ScrapeError> {
    let input = input.trim();

    if let Some(token) = &config.account_override {
        tracing::info!(token, "using configured account override, skipping resolution");
        return Ok(ResolvedStore {
            identifier: Identifier::from_token(token),
            referer: None,
        });
    }

    // Fast path: the user pasted a bare store ID instead of a URL.
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(ResolvedStore {
            identifier: Identifier::StoreId(input.to_string()),
            referer: None,
        });
    }

    match fetch::fetch_html(client, input).await {
        Ok(html) => {
            if let Some(identifier) = scan_html(&html) {
                tracing::debug!(%identifier, "identifier found in static HTML");
                return Ok(ResolvedStore {
                    identifier,
                    referer: Some(input.to_string()),
                });
            }
        }
        Err(err) => {
            tracing::debug!(url = input, error = %err, "static HTML fetch failed");
        }
    }

    if let Some(renderer) = renderer {
        match renderer.render_and_sniff(input).await {
            Ok(page) => {
                if let Some(identifier) = scan_observed_requests(&page.observed_requests) {
                    tracing::debug!(%identifier, "identifier found in sniffed network traffic");
                    return Ok(ResolvedStore {
                        identifier,
                        referer: Some(input.to_string()),
                    });
                }
                if let Some(identifier) = scan_html(&page.html) {
                    tracing::debug!(%identifier, "identifier found in rendered DOM");
                    return Ok(ResolvedStore {
                        identifier,
                        referer: Some(input.to_string()),
                    });
                }
            }
            Err(err) => {
                tracing::warn!(url = input, error = %err, "headless render failed");
            }
        }
    }

    Err(ScrapeError::Resolution {
        input: input.to_string(),
    })
}

/// Identifier patterns tried against page HTML, cheapest signal first.
/// Capture group 1 is the token; numeric tokens classify as store IDs.
const HTML_PATTERNS: [&str; 8] = [
    // Widget embed attributes.
    r#"data-stockist-widget-tag\s*=\s*["']([A-Za-z0-9_-]+)["']"#,
    r#"data-store-id\s*=\s*["'](\d+)["']"#,
    // API paths in script/iframe src values or inline code.
    r"stockist\.co/api/v1/([A-Za-z0-9_-]+)/",
    r"stocki\.st/api/v1/([A-Za-z0-9_-]+)/",
    // Script-injected config globals.
    r"_stockistConfigCallback_([A-Za-z0-9_-]+)",
    r#"stockist(?:StoreId|_store_id)\s*[:=]\s*["']?(\d+)"#,
    r#"Stockist\.init\(\s*["']([A-Za-z0-9_-]+)["']"#,
    r#"["']?widget_tag["']?\s*[:=]\s*["']([A-Za-z0-9_-]+)["']"#,
];

/// Query parameters on a stockist-hosted embed URL, e.g.
/// `<iframe src="https://stockist.co/widget?store=123">`. Anchored on the
/// known hosts so unrelated domains never match.
const EMBED_QUERY_PATTERN: &str =
    r#"src\s*=\s*["'][^"']*(?:stockist\.co|stocki\.st)/[^"']*[?&](?:store|account|tag)=([A-Za-z0-9_-]+)"#;

/// Scans HTML (static or rendered) for a store identifier.
#[must_use]
pub fn scan_html(html: &str) -> Option<Identifier> {
    for pattern in HTML_PATTERNS {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(token) = re.captures(html).and_then(|c| c.get(1)) {
            return Some(Identifier::from_token(token.as_str()));
        }
    }

    let re = Regex::new(EMBED_QUERY_PATTERN).expect("valid regex");
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|token| Identifier::from_token(token.as_str()))
}

/// Scans network requests observed during rendering. A full location API
/// URL wins outright (it needs no endpoint guessing later); otherwise an
/// account tag is pulled out of any stockist API path.
fn scan_observed_requests(urls: &[String]) -> Option<Identifier> {
    let api_re = Regex::new(r"/api/v1/([A-Za-z0-9_-]+)/").expect("valid regex");

    for url in urls {
        let lowered = url.to_ascii_lowercase();
        if !lowered.contains("stockist") && !lowered.contains("stocki.st") {
            continue;
        }
        if lowered.contains("/locations") {
            return Some(Identifier::EndpointUrl(url.clone()));
        }
        if let Some(tag) = api_re.captures(url).and_then(|c| c.get(1)) {
            return Some(Identifier::AccountTag(tag.as_str().to_string()));
        }
    }
    None
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
