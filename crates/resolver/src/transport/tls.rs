//! DNS-over-TLS transport (RFC 7858).
//!
//! The `rustls::ClientConfig` is built once and shared, so session
//! resumption works across queries. Idle connections are kept in a small
//! per-server pool to amortize the handshake cost.

use super::tcp::{read_with_length_prefix, send_with_length_prefix};
use super::DnsTransport;
use async_trait::async_trait;
use dashmap::DashMap;
use rustls::pki_types::ServerName;
use scout_dns_domain::{Protocol, ResolveError};
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

const MAX_IDLE_PER_HOST: usize = 2;

static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

static TLS_POOL: LazyLock<DashMap<SocketAddr, Vec<TlsStream<TcpStream>>>> =
    LazyLock::new(DashMap::new);

pub struct TlsTransport {
    server_addr: SocketAddr,
}

impl TlsTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn take_pooled(&self) -> Option<TlsStream<TcpStream>> {
        TLS_POOL.get_mut(&self.server_addr)?.pop()
    }

    fn return_to_pool(&self, stream: TlsStream<TcpStream>) {
        let mut entry = TLS_POOL.entry(self.server_addr).or_default();
        if entry.len() < MAX_IDLE_PER_HOST {
            entry.push(stream);
        }
        // A full pool simply drops (closes) the connection.
    }

    async fn connect_new(&self) -> Result<TlsStream<TcpStream>, ResolveError> {
        let connector = tokio_rustls::TlsConnector::from(SHARED_TLS_CONFIG.clone());

        // Endpoints are IP literals; the certificate is validated against
        // its IP subjectAltName, the way public DoT resolvers publish them.
        let server_name = ServerName::from(self.server_addr.ip());

        let tcp_stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            ResolveError::Transport(format!(
                "connection to TLS server {} failed: {}",
                self.server_addr, e
            ))
        })?;

        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| {
                ResolveError::Transport(format!(
                    "TLS handshake failed with {}: {}",
                    self.server_addr, e
                ))
            })?;

        debug!(server = %self.server_addr, "TLS connection established");
        Ok(tls_stream)
    }

    async fn exchange_inner(&self, query: &[u8]) -> Result<Vec<u8>, ResolveError> {
        // Reuse an idle connection when one exists; a stale one fails the
        // write and we fall back to a fresh handshake.
        if let Some(mut stream) = self.take_pooled() {
            if send_with_length_prefix(&mut stream, query).await.is_ok() {
                if let Ok(response) = read_with_length_prefix(&mut stream).await {
                    self.return_to_pool(stream);
                    return Ok(response);
                }
            }
        }

        let mut stream = self.connect_new().await?;
        send_with_length_prefix(&mut stream, query).await?;
        let response = read_with_length_prefix(&mut stream).await?;

        debug!(server = %self.server_addr, response_len = response.len(), "TLS response received");

        self.return_to_pool(stream);
        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, ResolveError> {
        tokio::time::timeout(timeout, self.exchange_inner(query))
            .await
            .map_err(|_| ResolveError::QueryTimeout)?
    }

    fn protocol(&self) -> Protocol {
        Protocol::TcpTls
    }
}
