//! Ordered pool of upstream servers with a retry/failover policy.

use crate::server::Server;
use scout_dns_domain::{RecordType, ResolveError, ResolverConfig, ResourceRecord};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

struct PoolInner {
    servers: Vec<Server>,
    max_retries: usize,
    overall_timeout: Option<Duration>,
    rng: fastrand::Rng,
}

/// An ordered collection of [`Server`]s plus a retry budget.
///
/// The pool lock guards membership, the budget and the randomness source
/// only; it is never held across a network exchange, so any number of
/// queries can be in flight against the same pool concurrently.
pub struct ServerPool {
    inner: Mutex<PoolInner>,
}

impl std::fmt::Debug for ServerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerPool").finish_non_exhaustive()
    }
}

impl ServerPool {
    /// Builds a pool from existing servers. A pool must contain at least
    /// one server before any query, so an empty list fails here rather
    /// than at use time.
    pub fn new(servers: Vec<Server>, max_retries: usize) -> Result<Self, ResolveError> {
        if servers.is_empty() {
            return Err(ResolveError::EmptyServerList);
        }

        Ok(Self {
            inner: Mutex::new(PoolInner {
                servers,
                max_retries,
                overall_timeout: None,
                rng: fastrand::Rng::new(),
            }),
        })
    }

    /// Builds a pool from `[protocol://]host[:port]` strings with a shared
    /// per-exchange timeout.
    pub fn from_addrs<S: AsRef<str>>(
        max_retries: usize,
        timeout: Duration,
        addrs: &[S],
    ) -> Result<Self, ResolveError> {
        let servers = addrs
            .iter()
            .map(|s| Server::from_addr(s.as_ref(), timeout))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(servers, max_retries)
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let servers = config
            .servers
            .iter()
            .map(|s| Server::from_addr(s, timeout))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = Self::new(servers, config.max_retries)?;
        if let Some(ms) = config.overall_timeout_ms {
            pool.lock().overall_timeout = Some(Duration::from_millis(ms));
        }
        Ok(pool)
    }

    /// The stock configuration: well-known public resolvers, 5 retries,
    /// 2 second exchanges. An explicitly constructed value, not process
    /// state; callers own it and tests can build isolated ones.
    pub fn default_pool() -> Self {
        Self::from_config(&ResolverConfig::default()).expect("stock configuration is valid")
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, server: Server) {
        self.lock().servers.push(server);
    }

    pub fn len(&self) -> usize {
        self.lock().servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().servers.is_empty()
    }

    pub fn max_retries(&self) -> usize {
        self.lock().max_retries
    }

    pub fn set_max_retries(&self, max_retries: usize) {
        self.lock().max_retries = max_retries;
    }

    /// Bounds every multi-attempt operation started after this call.
    pub fn set_overall_timeout(&self, timeout: Option<Duration>) {
        self.lock().overall_timeout = timeout;
    }

    /// Reseeds the pool's randomness source, fixing the server-selection
    /// and wildcard-probe sequences.
    pub fn seed_rng(&self, seed: u64) {
        self.lock().rng = fastrand::Rng::with_seed(seed);
    }

    /// Clones a random server out of the lock so the exchange itself runs
    /// without serializing other callers.
    fn pick(&self) -> Server {
        let mut inner = self.lock();
        match inner.servers.len() {
            1 => inner.servers[0].clone(),
            len => {
                let index = inner.rng.usize(..len);
                inner.servers[index].clone()
            }
        }
    }

    pub(crate) fn random_label(&self, len: usize) -> String {
        let alphabet = crate::wildcard::PROBE_ALPHABET.as_bytes();
        let mut inner = self.lock();
        (0..len)
            .map(|_| alphabet[inner.rng.usize(..alphabet.len())] as char)
            .collect()
    }

    /// Queries for `record_type` at `name`, failing over between servers.
    ///
    /// The first server is picked at random, as is each subsequent one; the
    /// total number of exchanges is bounded by the configured retry budget.
    /// Success and NXDOMAIN both stop the loop immediately: NXDOMAIN is an
    /// authoritative negative, retrying elsewhere cannot change it. Any
    /// other error consumes budget, and the last one seen is returned
    /// verbatim once the budget is exhausted.
    pub async fn try_query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ResourceRecord>, ResolveError> {
        let deadline = self.deadline();
        self.try_query_until(name, record_type, deadline).await
    }

    /// The deadline for one multi-attempt operation starting now.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.lock().overall_timeout.map(|t| Instant::now() + t)
    }

    /// Failover loop bounded by an externally computed deadline, so a
    /// composite operation such as wildcard detection can spread one
    /// deadline over all of its nested queries.
    pub(crate) async fn try_query_until(
        &self,
        name: &str,
        record_type: RecordType,
        deadline: Option<Instant>,
    ) -> Result<Vec<ResourceRecord>, ResolveError> {
        let max_retries = self.lock().max_retries;

        // A budget below 1 is a misconfiguration, not a transient
        // condition; it must never silently succeed.
        if max_retries < 1 {
            return Err(ResolveError::InvalidMaxRetries);
        }

        let mut last_err = ResolveError::InvalidMaxRetries;

        for attempt in 0..max_retries {
            // The deadline bounds the whole multi-attempt operation; a
            // retry never resets the clock.
            let cap = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(ResolveError::QueryTimeout);
                    }
                    Some(remaining)
                }
                None => None,
            };

            let server = self.pick();
            match server.query_capped(name, record_type, cap).await {
                Ok(records) => {
                    debug!(server = %server, name, record_type = %record_type, attempt, "query answered");
                    return Ok(records);
                }
                Err(e) if e.is_nxdomain() => return Err(e),
                Err(e) => {
                    warn!(server = %server, name, record_type = %record_type, attempt, error = %e, "query failed, failing over");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Whether a record of `record_type` is set for `name`. NXDOMAIN and
    /// "zero answers, no error" are both an error-free `false`; absence is
    /// a valid outcome for this predicate, not a failure.
    pub async fn is_set(&self, name: &str, record_type: RecordType) -> Result<bool, ResolveError> {
        self.is_set_until(name, record_type, self.deadline()).await
    }

    pub(crate) async fn is_set_until(
        &self,
        name: &str,
        record_type: RecordType,
        deadline: Option<Instant>,
    ) -> Result<bool, ResolveError> {
        match self.try_query_until(name, record_type, deadline).await {
            Ok(records) => Ok(!records.is_empty()),
            Err(e) if e.is_nxdomain() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl FromStr for ServerPool {
    type Err = ResolveError;

    /// A single-server pool from one endpoint string, with the stock retry
    /// budget and timeout.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config = ResolverConfig::default();
        Self::from_addrs(
            config.max_retries,
            Duration::from_millis(config.timeout_ms),
            &[s],
        )
    }
}
