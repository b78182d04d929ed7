use std::net::SocketAddr;

/// Application configuration, loaded from `STOCKCSV_*` environment
/// variables by [`crate::load_app_config`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Per-request timeout for plain HTTP fetches.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Page size for paginated location endpoints.
    pub per_page: u32,
    /// Delay between consecutive page requests to the same host.
    pub inter_request_delay_ms: u64,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Upper bound for a single headless render, navigation included.
    pub render_timeout_secs: u64,
    /// Whether the headless-render fallback may be used at all. Ignored
    /// when the server is built without the `headless` feature.
    pub headless_enabled: bool,
    /// Explicit account tag or store ID; when set, identifier resolution
    /// is bypassed entirely.
    pub account_override: Option<String>,
}
