//! Domain types for Stockist location extraction.

use serde_json::{Map, Value};

/// An untyped provider record; the key set varies per Stockist account and
/// widget version.
pub type RawRecord = Map<String, Value>;

/// The token that scopes API queries to one merchant's location set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Bare numeric store ID, e.g. `"98765"`.
    StoreId(String),
    /// Opaque account handle, e.g. `"u23010"`.
    AccountTag(String),
    /// Fully-qualified endpoint URL captured from observed network traffic
    /// during headless rendering.
    EndpointUrl(String),
}

impl Identifier {
    /// Classifies a raw token: all-digits becomes a store ID, anything else
    /// an account tag.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            Identifier::StoreId(token.to_string())
        } else {
            Identifier::AccountTag(token.to_string())
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::StoreId(id) => write!(f, "{id}"),
            Identifier::AccountTag(tag) => write!(f, "{tag}"),
            Identifier::EndpointUrl(url) => write!(f, "{url}"),
        }
    }
}

/// Result of identifier resolution. Lives for a single scrape invocation;
/// never cached across calls.
#[derive(Debug, Clone)]
pub struct ResolvedStore {
    pub identifier: Identifier,
    /// Page the identifier was found on, sent as the `Referer` header on
    /// API requests (some accounts reject referer-less queries).
    pub referer: Option<String>,
}

/// Tuning knobs for a scrape invocation.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub per_page: u32,
    pub inter_request_delay_ms: u64,
    /// Additional attempts after the first failure for transient errors
    /// (429/503, network failures).
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// When set, resolution is skipped and this token is used directly.
    pub account_override: Option<String>,
    /// API hosts tried for each endpoint shape, in order. Overridable so
    /// tests can point the transport at a mock server.
    pub api_hosts: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            )
            .to_string(),
            per_page: 250,
            inter_request_delay_ms: 250,
            max_retries: 1,
            retry_backoff_base_secs: 2,
            account_override: None,
            api_hosts: vec![
                "https://stockist.co".to_string(),
                "https://stocki.st".to_string(),
            ],
        }
    }
}

impl ScrapeConfig {
    /// Builds a scrape config from the application-level configuration.
    #[must_use]
    pub fn from_app_config(config: &stockcsv_core::AppConfig) -> Self {
        Self {
            request_timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            per_page: config.per_page,
            inter_request_delay_ms: config.inter_request_delay_ms,
            max_retries: config.max_retries,
            retry_backoff_base_secs: config.retry_backoff_base_secs,
            account_override: config.account_override.clone(),
            ..Self::default()
        }
    }
}
