use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No strategy could determine a store identifier. Terminal; the
    /// message is surfaced to the user verbatim.
    #[error("could not determine the store identifier from this page")]
    Resolution { input: String },

    /// An identifier was resolved but every endpoint candidate came back
    /// empty. Terminal; surfaced to the user verbatim.
    #[error("store identifier {identifier} was found but no location data could be retrieved")]
    Retrieval { identifier: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("rate limited by {host} (retry after {retry_after_secs}s)")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("headless render failed: {0}")]
    Render(String),
}
