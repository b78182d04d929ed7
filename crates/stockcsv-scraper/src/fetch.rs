//! Low-level HTTP helpers for the scrape pipeline.

use std::time::Duration;

use crate::error::ScrapeError;
use crate::types::ScrapeConfig;

/// A fetched response body together with its `Content-Type` header.
#[derive(Debug)]
pub(crate) struct FetchedBody {
    pub body: String,
    pub content_type: String,
}

/// Builds the shared HTTP client with configured timeout and user-agent.
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client` cannot
/// be constructed.
pub(crate) fn build_client(config: &ScrapeConfig) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}

/// Fetches the HTML body of a page with a simple unauthenticated GET.
///
/// # Errors
///
/// [`ScrapeError::Http`] on network failure, [`ScrapeError::HttpStatus`] on
/// any non-2xx status.
pub(crate) async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, ScrapeError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    Ok(response.text().await?)
}

/// Fetches a raw body of any content type, attaching the referer when known.
///
/// 429 and 503 are mapped to [`ScrapeError::RateLimited`] so the retry layer
/// can back off and try again; other non-2xx statuses become
/// [`ScrapeError::HttpStatus`] and abandon the candidate immediately.
pub(crate) async fn fetch_body(
    client: &reqwest::Client,
    url: &str,
    referer: Option<&str>,
) -> Result<FetchedBody, ScrapeError> {
    let mut request = client.get(url);
    if let Some(referer) = referer {
        request = request.header(reqwest::header::REFERER, referer);
    }
    let response = request.send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
    {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(5);
        return Err(ScrapeError::RateLimited {
            host: host_of(url),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let body = response.text().await?;

    Ok(FetchedBody { body, content_type })
}

/// Extracts the hostname from a URL for use in error messages. Falls back to
/// the full string if parsing fails.
pub(crate) fn host_of(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(url)
        .to_owned()
}
