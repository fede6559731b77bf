//! A single upstream server: one endpoint, one timeout, one transport.

use crate::codec;
use crate::transport::{create_transport, DnsTransport};
use scout_dns_domain::{
    Endpoint, Protocol, RcodeError, RecordType, ResolveError, ResourceRecord,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One upstream DNS server. Holds no mutable state during a query, so a
/// `Server` may be queried concurrently and cloned freely.
#[derive(Clone)]
pub struct Server {
    endpoint: Endpoint,
    timeout: Duration,
    transport: Arc<dyn DnsTransport>,
}

impl Server {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        let transport = create_transport(&endpoint);
        Self {
            endpoint,
            timeout,
            transport,
        }
    }

    /// Builds a server from the `[protocol://]host[:port]` string form;
    /// protocol defaults to `udp`, port to 53.
    pub fn from_addr(s: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let endpoint = Endpoint::from_str(s)?;
        Ok(Self::new(endpoint, timeout))
    }

    /// Same server with an injected transport. The escalation path built by
    /// [`Server::to_tcp`] always uses the real TCP transport.
    pub fn with_transport(
        endpoint: Endpoint,
        timeout: Duration,
        transport: Arc<dyn DnsTransport>,
    ) -> Self {
        Self {
            endpoint,
            timeout,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The TCP upgrade of this server: same address, same port, same
    /// timeout. `None` unless the server is UDP-based.
    pub fn to_tcp(&self) -> Option<Self> {
        if self.endpoint.protocol == Protocol::Udp {
            Some(Self::new(self.endpoint.to_tcp(), self.timeout))
        } else {
            None
        }
    }

    /// Sends one query for `record_type` at `name` and returns the answer
    /// section. A truncated UDP response transparently retries once over
    /// TCP; a truncated response on any other transport is terminal. A
    /// non-zero response code fails with the matching [`RcodeError`],
    /// NXDOMAIN included; classification happens in the pool.
    pub async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ResourceRecord>, ResolveError> {
        self.query_capped(name, record_type, None).await
    }

    /// As [`Server::query`], with the exchange timeout clamped to `cap`
    /// when one is given. Used by the pool to honor an overall deadline.
    pub(crate) async fn query_capped(
        &self,
        name: &str,
        record_type: RecordType,
        cap: Option<Duration>,
    ) -> Result<Vec<ResourceRecord>, ResolveError> {
        let timeout = cap.map_or(self.timeout, |c| c.min(self.timeout));
        let mut current = self.clone();

        loop {
            let (id, query) = codec::build_query(name, record_type)?;
            let response = current.transport.exchange(&query, timeout).await?;
            let wire = codec::parse_response(&response, id)?;

            if wire.truncated {
                match current.to_tcp() {
                    Some(tcp) => {
                        debug!(
                            server = %current.endpoint,
                            name,
                            record_type = %record_type,
                            "truncated response, retrying over TCP"
                        );
                        current = tcp;
                        continue;
                    }
                    // Truncation is resolved here by protocol escalation or
                    // not at all; the pool never fails over because of it.
                    None => return Err(ResolveError::Truncated),
                }
            }

            return match wire.rcode {
                RcodeError::NoError => Ok(wire.answers),
                rcode => Err(ResolveError::Rcode(rcode)),
            };
        }
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)
    }
}
