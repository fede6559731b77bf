use serde::{Deserialize, Serialize};

/// Stock public resolvers used by the default configuration.
pub const DEFAULT_SERVERS: [&str; 6] = [
    "8.8.8.8",
    "1.1.1.1",
    "9.9.9.10",
    "1.0.0.1",
    "8.8.4.4",
    "149.112.112.10",
];

pub const DEFAULT_MAX_RETRIES: usize = 5;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2000;

/// Resolver configuration. Endpoints use the `[protocol://]host[:port]`
/// string form; parsing happens when the pool is built, so an invalid
/// entry fails fast at construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    pub servers: Vec<String>,

    /// Total attempts allowed per query. Must be at least 1.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Per-exchange timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Optional bound on the whole multi-attempt operation. When set, every
    /// attempt's timeout is clamped to the time remaining.
    #[serde(default)]
    pub overall_timeout_ms: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: DEFAULT_SERVERS.iter().map(|s| s.to_string()).collect(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            overall_timeout_ms: None,
        }
    }
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_timeout_ms() -> u64 {
    DEFAULT_QUERY_TIMEOUT_MS
}
