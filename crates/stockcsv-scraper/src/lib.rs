//! Store-locator scraping for Stockist-powered merchant pages.
//!
//! The pipeline is resolve, retrieve, normalize, dedupe: figure out which
//! Stockist account a page belongs to, pull every location through the
//! endpoint-shape candidates, flatten the raw records into a fixed row
//! schema, and drop duplicates.

pub mod dedupe;
pub mod dom;
pub mod error;
pub mod normalize;
pub mod payload;
pub mod render;
pub mod resolver;
pub mod transport;
pub mod types;

mod fetch;
mod rate_limit;

#[cfg(feature = "headless")]
mod headless;

pub use error::ScrapeError;
pub use render::{PageRenderer, RenderedPage};
pub use types::{Identifier, RawRecord, ResolvedStore, ScrapeConfig};

pub use stockcsv_core::{NormalizedRow, CSV_COLUMNS};

#[cfg(feature = "headless")]
pub use headless::ChromiumRenderer;

/// Runs the full pipeline for one user input (page URL or bare store ID)
/// and returns deduplicated, normalized rows.
///
/// # Errors
///
/// Returns [`ScrapeError::Resolution`] when no store identifier can be
/// determined from the input, [`ScrapeError::Retrieval`] when an
/// identifier was found but every endpoint came back empty, and transport
/// errors when the initial page fetch itself fails unrecoverably.
pub async fn scrape_store_locations(
    input: &str,
    config: &ScrapeConfig,
    renderer: Option<&dyn PageRenderer>,
) -> Result<Vec<NormalizedRow>, ScrapeError> {
    let client = fetch::build_client(config)?;

    let resolved = resolver::resolve(input, config, &client, renderer).await?;
    tracing::info!(identifier = %resolved.identifier, "store identifier resolved");

    let records = match transport::fetch_all_locations(&client, &resolved, config).await {
        Ok(records) => records,
        Err(err @ ScrapeError::Retrieval { .. }) => {
            rendered_page_locations(input, renderer).await.ok_or(err)?
        }
        Err(err) => return Err(err),
    };
    tracing::info!(count = records.len(), "raw location records retrieved");

    let rows: Vec<NormalizedRow> = records.iter().map(normalize::normalize_record).collect();
    let rows = dedupe::dedupe_rows(rows);
    tracing::info!(count = rows.len(), "rows after deduplication");

    Ok(rows)
}

/// Last-resort retrieval: re-render the page and read the listing the
/// widget painted into the DOM. Only applies when the input is a page URL
/// and a renderer is available; any failure here keeps the original
/// retrieval error.
async fn rendered_page_locations(
    input: &str,
    renderer: Option<&dyn PageRenderer>,
) -> Option<Vec<RawRecord>> {
    let renderer = renderer?;
    if !input.trim().starts_with("http") {
        return None;
    }
    tracing::info!("endpoints yielded no records, extracting from rendered page");
    match renderer.render_and_sniff(input).await {
        Ok(page) => {
            let records = dom::extract_dom_locations(&page.html);
            if records.is_empty() {
                return None;
            }
            tracing::info!(count = records.len(), "records extracted from rendered DOM");
            Some(records)
        }
        Err(err) => {
            tracing::warn!(url = input, error = %err, "rendered page extraction failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
