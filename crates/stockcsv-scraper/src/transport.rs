//! Location retrieval across endpoint-shape variants.
//!
//! Stockist accounts expose their data through whichever transport their
//! widget version happens to use: a paginated JSON API (with or without a
//! `.json` suffix), a search endpoint, or a one-shot bulk "overview"
//! script. Candidates are tried strictly in order; a candidate that
//! errors or yields nothing is abandoned and the next one is tried.

use std::time::Duration;

use crate::error::ScrapeError;
use crate::fetch;
use crate::payload;
use crate::rate_limit::retry_with_backoff;
use crate::types::{Identifier, RawRecord, ResolvedStore, ScrapeConfig};

/// Hard ceiling on pages per candidate; guards against providers that
/// keep echoing the last page.
const MAX_PAGES: u32 = 200;

/// Endpoint path shapes tried per host and tag, in priority order.
const PAGINATED_SHAPES: [&str; 3] = ["locations/all", "locations/all.json", "locations/search"];
const BULK_SHAPE: &str = "overview.js";

/// One endpoint to try. `paginated` decides whether `page`/`per_page`
/// query parameters are injected and the page loop runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndpointCandidate {
    pub url: String,
    pub paginated: bool,
}

/// Fetches the complete raw location set for a resolved store.
///
/// # Errors
///
/// Returns [`ScrapeError::Retrieval`] when every candidate endpoint is
/// exhausted without producing a single record. Per-candidate failures are
/// logged and absorbed.
pub async fn fetch_all_locations(
    client: &reqwest::Client,
    resolved: &ResolvedStore,
    config: &ScrapeConfig,
) -> Result<Vec<RawRecord>, ScrapeError> {
    let candidates = candidate_endpoints(&resolved.identifier, &config.api_hosts);

    for candidate in &candidates {
        match fetch_candidate(client, candidate, resolved.referer.as_deref(), config).await {
            Ok(records) if !records.is_empty() => {
                tracing::info!(
                    url = candidate.url,
                    count = records.len(),
                    "candidate endpoint yielded records"
                );
                return Ok(records);
            }
            Ok(_) => {
                tracing::debug!(url = candidate.url, "candidate endpoint yielded no records");
            }
            Err(err) => {
                tracing::debug!(url = candidate.url, error = %err, "candidate endpoint failed");
            }
        }
    }

    Err(ScrapeError::Retrieval {
        identifier: resolved.identifier.to_string(),
    })
}

/// Builds the ordered candidate list for an identifier.
///
/// A sniffed endpoint URL always goes first (it needs no guessing), with
/// the regular tag-derived families appended as fallback when a tag can be
/// read out of the URL. Store IDs are tried both as `u<id>` (the usual
/// Stockist tag form) and bare.
pub(crate) fn candidate_endpoints(
    identifier: &Identifier,
    api_hosts: &[String],
) -> Vec<EndpointCandidate> {
    let mut candidates = Vec::new();

    let tags: Vec<String> = match identifier {
        Identifier::StoreId(id) => vec![format!("u{id}"), id.clone()],
        Identifier::AccountTag(tag) => vec![tag.clone()],
        Identifier::EndpointUrl(url) => {
            candidates.push(EndpointCandidate {
                url: url.clone(),
                paginated: url.contains("page="),
            });
            match tag_from_endpoint_url(url) {
                Some(tag) => vec![tag],
                None => return candidates,
            }
        }
    };

    for shape in PAGINATED_SHAPES {
        for host in api_hosts {
            for tag in &tags {
                candidates.push(EndpointCandidate {
                    url: format!("{host}/api/v1/{tag}/{shape}"),
                    paginated: true,
                });
            }
        }
    }
    for host in api_hosts {
        for tag in &tags {
            candidates.push(EndpointCandidate {
                url: format!("{host}/api/v1/{tag}/{BULK_SHAPE}"),
                paginated: false,
            });
        }
    }

    candidates
}

fn tag_from_endpoint_url(url: &str) -> Option<String> {
    let re = regex::Regex::new(r"/api/v1/([A-Za-z0-9_-]+)/").expect("valid regex");
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Runs one candidate to completion: a single request for bulk shapes, a
/// terminating page loop otherwise.
async fn fetch_candidate(
    client: &reqwest::Client,
    candidate: &EndpointCandidate,
    referer: Option<&str>,
    config: &ScrapeConfig,
) -> Result<Vec<RawRecord>, ScrapeError> {
    if !candidate.paginated {
        let fetched = fetch_with_retry(client, &candidate.url, referer, config).await?;
        let parsed = payload::parse_payload(&fetched.body, &fetched.content_type, &candidate.url);
        return Ok(parsed.records);
    }

    let per_page = config.per_page;
    let mut all: Vec<RawRecord> = Vec::new();
    let mut page = 1u32;

    loop {
        if page > MAX_PAGES {
            tracing::warn!(url = candidate.url, "pagination ceiling reached, stopping");
            break;
        }
        if page > 1 && config.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.inter_request_delay_ms)).await;
        }

        let url = page_url(&candidate.url, page, per_page);
        // Any page failing (retries included) abandons the whole candidate;
        // a partial page set must never be mistaken for the full listing.
        let fetched = fetch_with_retry(client, &url, referer, config).await?;

        let parsed = payload::parse_payload(&fetched.body, &fetched.content_type, &url);
        let count = parsed.records.len();
        all.extend(parsed.records);

        if parsed.exhausted {
            tracing::debug!(url, page, "provider reports pagination exhausted");
            break;
        }
        if count == 0 {
            break;
        }
        if (count as u32) < per_page {
            break;
        }
        page += 1;
    }

    Ok(all)
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    referer: Option<&str>,
    config: &ScrapeConfig,
) -> Result<fetch::FetchedBody, ScrapeError> {
    retry_with_backoff(config.max_retries, config.retry_backoff_base_secs, || {
        fetch::fetch_body(client, url, referer)
    })
    .await
}

/// Rebuilds a candidate URL with `page` and `per_page` set, replacing any
/// existing values of those parameters.
fn page_url(base: &str, page: u32, per_page: u32) -> String {
    match reqwest::Url::parse(base) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "page" && k != "per_page")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.set_query(None);
            {
                let mut pairs = url.query_pairs_mut();
                for (k, v) in &kept {
                    pairs.append_pair(k, v);
                }
                pairs.append_pair("page", &page.to_string());
                pairs.append_pair("per_page", &per_page.to_string());
            }
            url.to_string()
        }
        Err(_) => {
            let sep = if base.contains('?') { '&' } else { '?' };
            format!("{base}{sep}page={page}&per_page={per_page}")
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
