pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use scout_dns_domain::{Endpoint, Protocol, ResolveError};
use std::sync::Arc;
use std::time::Duration;

/// One send/receive exchange of a wire-format DNS message with a single
/// endpoint. Implementations hold no per-query state; a transport may be
/// shared by concurrent queries.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Sends `query` and returns the raw response bytes. The whole exchange
    /// is bounded by `timeout`.
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, ResolveError>;

    fn protocol(&self) -> Protocol;
}

pub fn create_transport(endpoint: &Endpoint) -> Arc<dyn DnsTransport> {
    match endpoint.protocol {
        Protocol::Udp => Arc::new(udp::UdpTransport::new(endpoint.addr)),
        Protocol::Tcp => Arc::new(tcp::TcpTransport::new(endpoint.addr)),
        Protocol::TcpTls => Arc::new(tls::TlsTransport::new(endpoint.addr)),
    }
}
